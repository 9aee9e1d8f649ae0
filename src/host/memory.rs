//! In-memory host: menus, identities, messages and a command table.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::core::command::MenuCommand;
use crate::core::notice::Notice;
use crate::core::types::{Identity, MenuDefinition, ResolvedArguments, Sender};
use crate::error::{Error, Result};

use super::{
    CommandTableSource, HostCommandTable, IdentityDirectory, MenuCatalog, MenuRef, MessageSink,
    PermissionChecker, TextTemplater,
};

/// One recorded `open_menu` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRecord {
    pub viewer: String,
    pub placeholder: Option<String>,
    pub arguments: Option<BTreeMap<String, String>>,
}

/// A menu that only remembers who opened it.
#[derive(Debug)]
pub struct StaticMenu {
    definition: MenuDefinition,
    opens: RefCell<Vec<OpenRecord>>,
}

impl StaticMenu {
    pub fn new(definition: MenuDefinition) -> Self {
        Self {
            definition,
            opens: RefCell::new(Vec::new()),
        }
    }

    pub fn opens(&self) -> Vec<OpenRecord> {
        self.opens.borrow().clone()
    }
}

impl MenuRef for StaticMenu {
    fn definition(&self) -> &MenuDefinition {
        &self.definition
    }

    fn open_menu(
        &self,
        viewer: &Identity,
        arguments: Option<ResolvedArguments>,
        placeholder: Option<&Identity>,
    ) {
        tracing::info!("Opening menu {} for {}", self.definition.name, viewer);
        self.opens.borrow_mut().push(OpenRecord {
            viewer: viewer.name.clone(),
            placeholder: placeholder.map(|p| p.name.clone()),
            arguments: arguments.map(ResolvedArguments::into_inner),
        });
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    menus: Vec<Rc<StaticMenu>>,
}

impl InMemoryCatalog {
    pub fn new(definitions: Vec<MenuDefinition>) -> Self {
        Self {
            menus: definitions
                .into_iter()
                .map(|d| Rc::new(StaticMenu::new(d)))
                .collect(),
        }
    }

    pub fn definitions(&self) -> Vec<MenuDefinition> {
        self.menus.iter().map(|m| m.definition.clone()).collect()
    }

    /// Every open of `menu_name` so far.
    pub fn opens_of(&self, menu_name: &str) -> Vec<OpenRecord> {
        self.menus
            .iter()
            .find(|m| m.definition.name == menu_name)
            .map(|m| m.opens())
            .unwrap_or_default()
    }
}

impl MenuCatalog for InMemoryCatalog {
    fn list_all(&self) -> Vec<Rc<dyn MenuRef>> {
        self.menus
            .iter()
            .map(|m| Rc::clone(m) as Rc<dyn MenuRef>)
            .collect()
    }

    fn find_by_name(&self, name: &str) -> Option<Rc<dyn MenuRef>> {
        self.menus
            .iter()
            .find(|m| m.definition.name == name)
            .map(|m| Rc::clone(m) as Rc<dyn MenuRef>)
    }

    fn list_all_names(&self) -> Vec<String> {
        self.menus.iter().map(|m| m.definition.name.clone()).collect()
    }

    fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

/// An identity known to the in-memory directory.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub name: String,
    pub online: bool,
    pub permissions: HashSet<String>,
}

impl IdentityRecord {
    pub fn online(name: &str, permissions: &[&str]) -> Self {
        Self::with(name, true, permissions.iter().map(|p| p.to_string()))
    }

    pub fn offline(name: &str, permissions: &[&str]) -> Self {
        Self::with(name, false, permissions.iter().map(|p| p.to_string()))
    }

    pub fn with(name: &str, online: bool, permissions: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.to_string(),
            online,
            permissions: permissions.into_iter().collect(),
        }
    }
}

/// Identities and their permission grants.
///
/// A grant of `*` allows everything; `a.b.*` allows `a.b` and anything below.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    identities: Vec<IdentityRecord>,
    console: HashSet<String>,
}

impl InMemoryDirectory {
    pub fn new(identities: Vec<IdentityRecord>, console_permissions: &[&str]) -> Self {
        Self {
            identities,
            console: console_permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_console_grants(identities: Vec<IdentityRecord>, console: HashSet<String>) -> Self {
        Self {
            identities,
            console,
        }
    }

    fn record(&self, name: &str) -> Option<&IdentityRecord> {
        self.identities
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

fn grants(granted: &HashSet<String>, node: &str) -> bool {
    if granted.contains("*") || granted.contains(node) {
        return true;
    }
    granted.iter().any(|g| {
        g.strip_suffix(".*")
            .map(|base| node == base || node.starts_with(&format!("{}.", base)))
            .unwrap_or(false)
    })
}

impl IdentityDirectory for InMemoryDirectory {
    fn find_online_exact(&self, name: &str) -> Option<Identity> {
        self.record(name)
            .filter(|r| r.online)
            .map(|r| Identity::new(r.name.clone()))
    }

    fn online_names(&self) -> Vec<String> {
        self.identities
            .iter()
            .filter(|r| r.online)
            .map(|r| r.name.clone())
            .collect()
    }
}

impl PermissionChecker for InMemoryDirectory {
    fn has(&self, sender: &Sender, node: &str) -> bool {
        match sender {
            Sender::Console => grants(&self.console, node),
            Sender::Actor(identity) => self
                .record(&identity.name)
                .map(|r| grants(&r.permissions, node))
                .unwrap_or(false),
        }
    }
}

/// A message delivered to a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub key: String,
    pub text: String,
}

/// Renders notices from templates and keeps what it sent.
#[derive(Debug, Default)]
pub struct RecordingSink {
    templates: HashMap<String, String>,
    sent: RefCell<Vec<SentMessage>>,
}

impl RecordingSink {
    /// Sink using `templates` (keyed by notice key) over the defaults.
    pub fn with_templates(templates: HashMap<String, String>) -> Self {
        Self {
            templates,
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.borrow().clone()
    }

    /// Take everything sent so far.
    pub fn drain(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl MessageSink for RecordingSink {
    fn send(&self, to: &Sender, notice: &Notice) {
        let template = self
            .templates
            .get(notice.key())
            .map(String::as_str)
            .unwrap_or_else(|| notice.default_template());
        let text = notice.render(template);
        tracing::debug!("-> {}: {}", to.name(), text);
        self.sent.borrow_mut().push(SentMessage {
            to: to.name().to_string(),
            key: notice.key().to_string(),
            text,
        });
    }
}

/// Replaces `{player}` and `{player_name}` with the viewer's name.
#[derive(Debug, Default, Clone, Copy)]
pub struct BraceTemplater;

impl TextTemplater for BraceTemplater {
    fn render(&self, text: &str, viewer: &Identity) -> String {
        if !(text.contains('{') && text.contains('}')) {
            return text.to_string();
        }
        text.replace("{player_name}", &viewer.name)
            .replace("{player}", &viewer.name)
    }
}

/// Command table behaving like a typical host dispatcher.
///
/// Namespaced keys always point at the latest registration. Bare keys are
/// first come, first served.
#[derive(Debug, Default)]
pub struct InMemoryCommandTable {
    commands: RefCell<BTreeMap<String, Rc<MenuCommand>>>,
}

impl InMemoryCommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `command` under `key` directly, as a host might on its own.
    pub fn insert_raw(&self, key: &str, command: Rc<MenuCommand>) {
        self.commands.borrow_mut().insert(key.to_string(), command);
    }

    fn insert(&self, namespace: &str, name: &str, command: &Rc<MenuCommand>) -> bool {
        let mut commands = self.commands.borrow_mut();
        commands.insert(format!("{}:{}", namespace, name), Rc::clone(command));
        if commands.contains_key(name) {
            return false;
        }
        commands.insert(name.to_string(), Rc::clone(command));
        true
    }
}

impl HostCommandTable for InMemoryCommandTable {
    fn register(&self, namespace: &str, command: Rc<MenuCommand>) -> bool {
        let namespace = namespace.trim().to_lowercase();
        let registered = self.insert(&namespace, command.label(), &command);
        for alias in command.aliases() {
            if !self.insert(&namespace, &alias, &command) {
                tracing::debug!("Alias {} already taken, kept as {}:{}", alias, namespace, alias);
            }
        }
        registered
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.commands.borrow_mut().remove(key).is_some())
    }

    fn lookup(&self, key: &str) -> Option<Rc<MenuCommand>> {
        self.commands.borrow().get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.commands.borrow().keys().cloned().collect()
    }
}

/// Hands out a shared in-memory table.
pub struct SharedTable(pub Rc<InMemoryCommandTable>);

impl CommandTableSource for SharedTable {
    fn acquire(&self) -> Result<Rc<dyn HostCommandTable>> {
        Ok(Rc::clone(&self.0) as Rc<dyn HostCommandTable>)
    }
}

/// A source whose table can never be reached.
pub struct UnreachableTable {
    reason: String,
}

impl UnreachableTable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CommandTableSource for UnreachableTable {
    fn acquire(&self) -> Result<Rc<dyn HostCommandTable>> {
        Err(Error::CommandTable(self.reason.clone()))
    }
}
