//! Core module - argument binding, dispatch and command registration.
//!
//! This module contains the heart of menudispatch:
//! - Positional argument binding
//! - Viewer/placeholder resolution and the ad-hoc and bound open commands
//! - Tab-completion for the ad-hoc command
//! - The register/unregister lifecycle against the host command table

pub mod binder;
pub mod command;
pub mod completion;
pub mod dispatch;
pub mod identity;
pub mod notice;
pub mod registry;
pub mod types;

pub use binder::{bind, BindingFailure, MissingPolicy};
pub use command::MenuCommand;
pub use dispatch::{Dispatch, Dispatcher};
pub use identity::{IdentityResolver, PermissionNodes};
pub use notice::Notice;
pub use registry::{CommandRegistration, CommandRegistry, RegistrationState};
pub use types::{Identity, MenuDefinition, ParameterDeclaration, ResolvedArguments, Sender};
