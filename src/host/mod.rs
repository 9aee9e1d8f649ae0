//! Contracts for everything the core consumes from its host.
//!
//! The core never reaches into host internals directly. Each concern sits
//! behind one of these traits; [`memory`] holds in-memory implementations
//! used by the CLI and the tests.

use std::rc::Rc;

use crate::core::command::MenuCommand;
use crate::core::notice::Notice;
use crate::core::types::{Identity, MenuDefinition, ResolvedArguments, Sender};
use crate::error::Result;

pub mod memory;

/// A loaded menu that can be opened.
pub trait MenuRef {
    fn definition(&self) -> &MenuDefinition;

    /// Show the menu to `viewer`. Rendering is entirely the host's business.
    fn open_menu(
        &self,
        viewer: &Identity,
        arguments: Option<ResolvedArguments>,
        placeholder: Option<&Identity>,
    );
}

pub trait MenuCatalog {
    fn list_all(&self) -> Vec<Rc<dyn MenuRef>>;

    fn find_by_name(&self, name: &str) -> Option<Rc<dyn MenuRef>>;

    fn list_all_names(&self) -> Vec<String>;

    fn is_empty(&self) -> bool {
        self.list_all().is_empty()
    }
}

pub trait IdentityDirectory {
    /// Online identity whose name matches exactly, ignoring case.
    fn find_online_exact(&self, name: &str) -> Option<Identity>;

    fn online_names(&self) -> Vec<String>;
}

pub trait PermissionChecker {
    fn has(&self, sender: &Sender, node: &str) -> bool;
}

pub trait MessageSink {
    fn send(&self, to: &Sender, notice: &Notice);
}

/// Placeholder substitution for free text such as usage messages.
pub trait TextTemplater {
    fn render(&self, text: &str, viewer: &Identity) -> String;
}

/// The host dispatcher's name -> command table.
pub trait HostCommandTable {
    /// Insert `command` under its label and aliases, bare and as
    /// `namespace:name`. Returns false when the bare label was already taken.
    fn register(&self, namespace: &str, command: Rc<MenuCommand>) -> bool;

    /// Remove a single key. Returns whether anything was removed.
    fn remove(&self, key: &str) -> Result<bool>;

    fn lookup(&self, key: &str) -> Option<Rc<MenuCommand>>;

    fn keys(&self) -> Vec<String>;
}

/// Hands out the process-wide command table. Called once at start-up.
pub trait CommandTableSource {
    fn acquire(&self) -> Result<Rc<dyn HostCommandTable>>;
}
