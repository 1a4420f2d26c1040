//! A little green figure that waves, can be dragged, flung, rotated and stretched, and
//! springs back home when let go.

pub mod bezop;
pub mod config;
pub mod easing;
pub mod error;
pub mod gesture;
pub mod limb;
pub mod render;
pub mod script;
pub mod settle;
pub mod spring;
pub mod state;
pub mod touch;
pub mod transform;
pub mod velocity;
pub mod view;

pub use config::{Color, DroidConfig, MeasureSpec};
pub use limb::StartDelay;
pub use render::Figure;
pub use touch::{TouchAction, TouchEvent};
pub use view::{Droid, Host, Invalidation, RecordingHost};
