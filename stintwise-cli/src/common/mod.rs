pub mod duration;
pub mod presets;
pub mod store;

pub use duration::{format_duration, format_gap, parse_duration_ms};
pub use presets::{find_preset, list_presets};
pub use store::JsonFileStore;
