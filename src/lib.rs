// Library surface for headless/integration tests and reuse.
// The binary only adds the CLI and terminal setup on top of this.
pub mod app_dirs;
pub mod arc;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod page;
pub mod press;
pub mod runtime;
pub mod svg;
pub mod ui;
pub mod view;
pub mod widget;

pub use error::{Error, Result};
