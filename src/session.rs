//! A running host built from settings.
//!
//! Wires the in-memory collaborators together, registers a command for each
//! menu at start-up and unregisters them on shutdown.

use std::rc::Rc;

use crate::config::{validate_settings, Settings};
use crate::core::dispatch::{Dispatch, Dispatcher};
use crate::core::identity::PermissionNodes;
use crate::core::registry::CommandRegistry;
use crate::core::types::Sender;
use crate::error::{Error, Result};
use crate::host::memory::{
    BraceTemplater, IdentityRecord, InMemoryCatalog, InMemoryCommandTable, InMemoryDirectory,
    RecordingSink, SharedTable,
};
use crate::host::{CommandTableSource, HostCommandTable};

pub struct Session {
    pub catalog: InMemoryCatalog,
    pub directory: InMemoryDirectory,
    pub sink: RecordingSink,
    templater: BraceTemplater,
    nodes: PermissionNodes,
    /// `None` when the command table could not be acquired.
    registry: Option<CommandRegistry>,
}

impl Session {
    /// Session over a fresh in-memory command table.
    pub fn start(settings: &Settings) -> Result<Self> {
        let table = Rc::new(InMemoryCommandTable::new());
        Self::start_with(settings, &SharedTable(table))
    }

    /// Session whose command table comes from `source`.
    ///
    /// An unreachable table only disables the bound commands; ad-hoc opening
    /// keeps working.
    pub fn start_with(settings: &Settings, source: &dyn CommandTableSource) -> Result<Self> {
        validate_settings(settings)?;
        let definitions = settings.menu_definitions()?;

        let identities = settings
            .identities
            .iter()
            .map(|i| IdentityRecord::with(&i.name, i.online, i.permissions.iter().cloned()))
            .collect();
        let directory = InMemoryDirectory::with_console_grants(
            identities,
            settings.console_permissions.iter().cloned().collect(),
        );

        let registry = match CommandRegistry::connect(source, &settings.namespace) {
            Ok(mut registry) => {
                registry.reload(&definitions)?;
                Some(registry)
            }
            Err(e) => {
                tracing::error!("Menu commands will not be registered: {}", e);
                None
            }
        };

        Ok(Self {
            catalog: InMemoryCatalog::new(definitions),
            directory,
            sink: RecordingSink::with_templates(settings.messages.clone()),
            templater: BraceTemplater,
            nodes: PermissionNodes::for_namespace(&settings.namespace),
            registry,
        })
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher {
            catalog: &self.catalog,
            identities: &self.directory,
            permissions: &self.directory,
            messages: &self.sink,
            templater: &self.templater,
            nodes: self.nodes.clone(),
        }
    }

    pub fn registry(&self) -> Option<&CommandRegistry> {
        self.registry.as_ref()
    }

    /// `open ...` as typed by `sender`.
    pub fn open(&self, sender: &Sender, tokens: &[String]) -> Dispatch {
        self.dispatcher().open_ad_hoc(sender, tokens)
    }

    pub fn complete(&self, sender: &Sender, tokens: &[String]) -> Option<Vec<String>> {
        self.dispatcher().complete_open(sender, tokens)
    }

    /// Run whatever command the host table has under `label`.
    pub fn run(&self, sender: &Sender, label: &str, tokens: &[String]) -> Result<Dispatch> {
        let table = self.table()?;
        let command = table
            .lookup(label)
            .ok_or_else(|| Error::NotFound(format!("unknown command: {}", label)))?;
        Ok(command.execute(&self.dispatcher(), sender, tokens)?)
    }

    /// Every key currently in the host command table.
    pub fn command_keys(&self) -> Result<Vec<String>> {
        Ok(self.table()?.keys())
    }

    /// Unregister every menu command.
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(registry) = self.registry.as_mut() {
            registry.unregister_all()?;
        }
        Ok(())
    }

    fn table(&self) -> Result<&Rc<dyn HostCommandTable>> {
        self.registry
            .as_ref()
            .map(CommandRegistry::table)
            .ok_or_else(|| Error::CommandTable("menu commands are not registered".to_string()))
    }
}
