//! # Configuration Handles
//!
//! Layered TOML configuration with typed accessors.
//!
//! ## Layers
//!
//! Values are looked up in the following order (earlier sources win):
//! 1. **Overrides** - values set at runtime with `set_*`
//! 2. **conf.d fragments** - `*.toml` files merged in file name order
//! 3. **Config file** - the first candidate that loads
//! 4. **Defaults** - fallbacks registered with `set_default`
//!
//! ## Usage Example
//!
//! ```toml
//! # /etc/myapp/myapp.toml
//! debug = false
//!
//! [server]
//! address = "127.0.0.1:8080"
//! timeout = "15s"
//! ```
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use layerconf::{Conf, ConfigHandle};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigHandle::new_confd(
//!         "myapp",
//!         "/etc/myapp/conf.d",
//!         &[PathBuf::from("/etc/myapp/myapp.toml")],
//!     );
//!     for diagnostic in config.diagnostics() {
//!         eprintln!("skipped: {diagnostic}");
//!     }
//!
//!     let timeout = config.get_duration("server.timeout");
//!     config.set_duration("server.timeout", timeout * 2);
//!     config.save()?;
//!     Ok(())
//! }
//! ```

pub mod confd;
pub mod defaults;
pub mod handle;
pub mod loading;
pub mod traits;
pub mod types;

pub use confd::merge_directory;
pub use handle::{ConfigBuilder, ConfigHandle};
pub use loading::{Resolution, ResolveOptions, resolve};
pub use traits::Conf;
pub use types::{LoadDiagnostic, LoadStage, MissingDirPolicy};
