//! Settings store: the value model, the layered key/value map, deep merge
//! and the duration text codec.

pub mod duration;
pub mod merge;
pub mod settings;
pub mod value;

pub use duration::{format_duration, parse_duration};
pub use merge::deep_merge;
pub use settings::Settings;
pub use value::{Table, Value};
