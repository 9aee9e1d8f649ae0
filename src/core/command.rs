//! The command object a menu exposes in the host command table.

use std::cell::{Cell, RefCell};

use crate::error::LifecycleError;

use super::dispatch::{Dispatch, Dispatcher};
use super::types::{MenuDefinition, Sender};

/// One per menu. Holds the menu's name, never the menu itself.
#[derive(Debug)]
pub struct MenuCommand {
    label: String,
    aliases: RefCell<Vec<String>>,
    menu_name: String,
    removed: Cell<bool>,
}

impl MenuCommand {
    pub fn for_menu(menu: &MenuDefinition) -> Self {
        Self {
            label: menu.primary_command().to_string(),
            aliases: RefCell::new(menu.secondary_aliases().to_vec()),
            menu_name: menu.name.clone(),
            removed: Cell::new(false),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Aliases currently attached. The host may change them after registration.
    pub fn aliases(&self) -> Vec<String> {
        self.aliases.borrow().clone()
    }

    pub fn set_aliases(&self, aliases: Vec<String>) {
        *self.aliases.borrow_mut() = aliases;
    }

    pub fn menu_name(&self) -> &str {
        &self.menu_name
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    pub(crate) fn mark_removed(&self) {
        self.removed.set(true);
    }

    /// Run the command for `sender` with the tokens typed after the label.
    pub fn execute<S: AsRef<str>>(
        &self,
        dispatcher: &Dispatcher<'_>,
        sender: &Sender,
        tokens: &[S],
    ) -> Result<Dispatch, LifecycleError> {
        if self.is_removed() {
            return Err(LifecycleError::Unregistered(self.label.clone()));
        }
        Ok(dispatcher.open_bound(sender, &self.menu_name, tokens))
    }
}
