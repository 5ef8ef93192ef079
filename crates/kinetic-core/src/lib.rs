pub mod animator;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod oscillator;
pub mod placement;
pub mod popover;
pub mod spring;
pub mod style;
pub mod timeline;
pub mod wheel;

pub use animator::{AnimatorEvent, AnimatorOptions, ElementAnimator, FinishReason, Inputs, Phase};
pub use calendar::{DateAnchor, DateField, DatePicker};
pub use clock::{Clock, ManualClock, WallClock};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use placement::{Placement, PlacementEngine, Rect, Size, Viewport};
pub use popover::{Popover, PopoverFrame, PopoverOptions};
pub use spring::{Spring, SpringParams, SpringRef};
pub use style::Style;
pub use timeline::{FillMode, Surface, SurfaceHandle, Timeline};
pub use wheel::{TickWheel, WheelChange, WheelParams};
