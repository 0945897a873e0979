pub mod age;
pub mod age_info;
pub mod config;
pub mod time_source;
pub mod widget;

pub use age::{AgeBreakdown, compute};
pub use config::Config;
pub use time_source::{AcquiredInstant, Clock, InstantSource, TimeSource};
pub use widget::Widget;
