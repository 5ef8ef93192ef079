mod popover;
mod status_bar;
mod wheel;

pub use popover::PopoverWidget;
pub use status_bar::StatusBarWidget;
pub use wheel::WheelWidget;
