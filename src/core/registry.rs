//! Registering menu commands with the host command table.
//!
//! Each menu command goes `Unbound -> Bound -> Removed`, once, in order.
//! Removal clears every key, bare and namespaced, that still points at
//! this command. Keys another command has taken over are left alone.

use std::rc::Rc;

use crate::error::{Error, LifecycleError, Result};
use crate::host::{CommandTableSource, HostCommandTable};

use super::command::MenuCommand;
use super::types::MenuDefinition;

/// Observable registration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unbound,
    Bound,
    Removed,
}

#[derive(Debug)]
enum Slot {
    Unbound(Rc<MenuCommand>),
    Bound(Rc<MenuCommand>),
    Removed,
}

/// A single menu command's registration.
#[derive(Debug)]
pub struct CommandRegistration {
    menu_name: String,
    label: String,
    slot: Slot,
}

impl CommandRegistration {
    pub fn new(menu: &MenuDefinition) -> Self {
        let command = MenuCommand::for_menu(menu);
        Self {
            menu_name: menu.name.clone(),
            label: command.label().to_string(),
            slot: Slot::Unbound(Rc::new(command)),
        }
    }

    pub fn state(&self) -> RegistrationState {
        match self.slot {
            Slot::Unbound(_) => RegistrationState::Unbound,
            Slot::Bound(_) => RegistrationState::Bound,
            Slot::Removed => RegistrationState::Removed,
        }
    }

    pub fn menu_name(&self) -> &str {
        &self.menu_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The command object, until it has been removed.
    pub fn command(&self) -> Option<&Rc<MenuCommand>> {
        match &self.slot {
            Slot::Unbound(command) | Slot::Bound(command) => Some(command),
            Slot::Removed => None,
        }
    }

    /// Insert the command into `table` under `prefix`.
    ///
    /// The registration is bound afterwards even if the host declined the
    /// bare label; the namespaced key still reaches it.
    pub fn register(
        &mut self,
        table: &dyn HostCommandTable,
        prefix: &str,
    ) -> std::result::Result<(), LifecycleError> {
        let command = match &self.slot {
            Slot::Unbound(command) => Rc::clone(command),
            Slot::Bound(_) | Slot::Removed => {
                return Err(LifecycleError::AlreadyRegistered(self.label.clone()));
            }
        };

        if table.register(prefix, Rc::clone(&command)) {
            tracing::debug!(
                "Registered command: {} for menu: {}",
                self.label,
                self.menu_name
            );
        } else {
            tracing::warn!(
                "Command {} for menu {} is only reachable as {}:{}",
                self.label,
                self.menu_name,
                prefix,
                self.label
            );
        }

        self.slot = Slot::Bound(command);
        Ok(())
    }

    /// Remove every key in `table` that still maps to this command.
    pub fn unregister(
        &mut self,
        table: &dyn HostCommandTable,
        prefix: &str,
    ) -> std::result::Result<(), LifecycleError> {
        let command = match &self.slot {
            Slot::Bound(command) => Rc::clone(command),
            Slot::Unbound(_) => return Err(LifecycleError::NotRegistered(self.label.clone())),
            Slot::Removed => {
                return Err(LifecycleError::AlreadyUnregistered(self.label.clone()));
            }
        };

        let mut names = vec![command.label().to_string()];
        names.extend(command.aliases());

        let mut failures = 0usize;
        for name in &names {
            for key in [name.clone(), format!("{}:{}", prefix, name)] {
                match table.lookup(&key) {
                    Some(owner) if Rc::ptr_eq(&owner, &command) => {}
                    _ => continue,
                }
                if let Err(e) = table.remove(&key) {
                    failures += 1;
                    tracing::error!("Failed to remove command key {}: {}", key, e);
                }
            }
        }

        command.mark_removed();
        self.slot = Slot::Removed;

        if failures == 0 {
            tracing::debug!("Successfully unregistered command: {}", self.label);
        } else {
            tracing::warn!(
                "Unregistered command {} with {} key(s) left behind",
                self.label,
                failures
            );
        }
        Ok(())
    }
}

/// All menu command registrations for one host command table.
pub struct CommandRegistry {
    table: Rc<dyn HostCommandTable>,
    prefix: String,
    registrations: Vec<CommandRegistration>,
}

impl CommandRegistry {
    /// Registry over an already acquired table. `namespace` becomes the
    /// fallback prefix for namespaced keys.
    pub fn new(table: Rc<dyn HostCommandTable>, namespace: &str) -> Self {
        Self {
            table,
            prefix: namespace.trim().to_lowercase(),
            registrations: Vec::new(),
        }
    }

    /// Acquire the table from `source`. Failure is left to the caller.
    pub fn connect(source: &dyn CommandTableSource, namespace: &str) -> Result<Self> {
        let table = source.acquire()?;
        Ok(Self::new(table, namespace))
    }

    pub fn fallback_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn table(&self) -> &Rc<dyn HostCommandTable> {
        &self.table
    }

    /// Create and bind the command for `menu`.
    ///
    /// Returns `Ok(false)` when the menu does not want a command.
    pub fn register_menu(&mut self, menu: &MenuDefinition) -> Result<bool> {
        if !menu.register_command {
            tracing::trace!("Menu {} has no command to register", menu.name);
            return Ok(false);
        }
        if let Some(existing) = self.find(&menu.name) {
            return Err(LifecycleError::AlreadyRegistered(existing.label.clone()).into());
        }

        let mut registration = CommandRegistration::new(menu);
        registration.register(self.table.as_ref(), &self.prefix)?;
        self.registrations.push(registration);
        Ok(true)
    }

    /// Unbind and forget the command for `menu_name`.
    pub fn unregister_menu(&mut self, menu_name: &str) -> Result<()> {
        let index = self
            .registrations
            .iter()
            .position(|r| r.menu_name == menu_name)
            .ok_or_else(|| Error::NotFound(format!("no command registered for menu {}", menu_name)))?;

        let mut registration = self.registrations.remove(index);
        registration.unregister(self.table.as_ref(), &self.prefix)?;
        Ok(())
    }

    /// Unbind everything, most recent registration first.
    pub fn unregister_all(&mut self) -> Result<()> {
        while let Some(mut registration) = self.registrations.pop() {
            registration.unregister(self.table.as_ref(), &self.prefix)?;
        }
        Ok(())
    }

    /// Replace every registration with commands for `menus`.
    ///
    /// If any menu fails to register, the ones already bound are removed
    /// again before the error is returned.
    pub fn reload(&mut self, menus: &[MenuDefinition]) -> Result<usize> {
        self.unregister_all()?;
        let mut count = 0;
        for menu in menus {
            match self.register_menu(menu) {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Failed to register command for menu {}: {}", menu.name, e);
                    self.unregister_all()?;
                    return Err(e);
                }
            }
        }
        tracing::info!("Registered {} menu command(s)", count);
        Ok(count)
    }

    /// Primary names of the live commands, in registration order.
    pub fn registered_names(&self) -> Vec<String> {
        self.registrations.iter().map(|r| r.label.clone()).collect()
    }

    pub fn find(&self, menu_name: &str) -> Option<&CommandRegistration> {
        self.registrations.iter().find(|r| r.menu_name == menu_name)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
