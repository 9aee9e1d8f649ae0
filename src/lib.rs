//! menudispatch library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod logging;
pub mod session;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use crate::core::{bind, CommandRegistry, Dispatch, Dispatcher, MenuDefinition, Notice, Sender};
pub use error::{Error, LifecycleError, Result};
pub use session::Session;
