pub mod config;
pub mod keyframes;
pub mod place;
pub mod run;
pub mod simulate;
pub mod wheel;
