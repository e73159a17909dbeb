//! layerconf: thread-safe layered TOML configuration
//!
//! Loads settings from a list of candidate files (or a default search path),
//! optionally merges a conf.d directory of override fragments, and exposes
//! typed getters and setters that can be saved back to disk.
//!
//! # Main Entry Points
//!
//! - [`ConfigHandle`] - load, query, modify and save a configuration
//! - [`Conf`] - the typed accessor trait callers can program against
//! - [`Settings`] - the layered store underneath a handle
//! - [`logging`] - logger presets derived from the `debug` key

pub mod config;
pub mod errors;
pub mod logging;
pub mod store;

pub use config::{
    Conf, ConfigBuilder, ConfigHandle, LoadDiagnostic, LoadStage, MissingDirPolicy, ResolveOptions,
};
pub use errors::{ConfError, ConfResult, LayerconfError};
pub use logging::{LogConfig, LogFormat, init_logging};
pub use store::{Settings, Table, Value};
