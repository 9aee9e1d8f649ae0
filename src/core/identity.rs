//! Viewer and placeholder resolution plus the permission gates around them.

use crate::host::{IdentityDirectory, PermissionChecker};

use super::notice::Notice;
use super::types::{Identity, Sender};

/// Permission nodes checked by the open commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionNodes {
    pub open: String,
    pub open_others: String,
    pub placeholders_for: String,
    pub placeholders_exempt: String,
}

impl PermissionNodes {
    /// Nodes under `namespace`, e.g. `menudispatch.open.others`.
    pub fn for_namespace(namespace: &str) -> Self {
        let ns = namespace.trim().to_lowercase();
        Self {
            open: format!("{}.open", ns),
            open_others: format!("{}.open.others", ns),
            placeholders_for: format!("{}.placeholdersfor", ns),
            placeholders_exempt: format!("{}.placeholdersfor.exempt", ns),
        }
    }
}

pub struct IdentityResolver<'a> {
    identities: &'a dyn IdentityDirectory,
    permissions: &'a dyn PermissionChecker,
    nodes: &'a PermissionNodes,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(
        identities: &'a dyn IdentityDirectory,
        permissions: &'a dyn PermissionChecker,
        nodes: &'a PermissionNodes,
    ) -> Self {
        Self {
            identities,
            permissions,
            nodes,
        }
    }

    pub fn require(&self, sender: &Sender, node: &str) -> Result<(), Notice> {
        if self.permissions.has(sender, node) {
            Ok(())
        } else {
            tracing::debug!("{} lacks permission {}", sender.name(), node);
            Err(Notice::NoPermission)
        }
    }

    pub fn require_open(&self, sender: &Sender) -> Result<(), Notice> {
        self.require(sender, &self.nodes.open)
    }

    pub fn require_placeholders(&self, sender: &Sender) -> Result<(), Notice> {
        self.require(sender, &self.nodes.placeholders_for)
    }

    /// Who the menu is shown to.
    ///
    /// An explicit target needs `open.others` when an actor asks for it; the
    /// console may target anyone. Without a target the sender views the menu
    /// itself, which the console cannot do.
    pub fn resolve_viewer(&self, sender: &Sender, target: Option<&str>) -> Result<Identity, Notice> {
        match target {
            Some(name) => {
                if sender.is_actor() {
                    self.require(sender, &self.nodes.open_others)?;
                }
                self.online(name)
            }
            None => sender
                .as_actor()
                .cloned()
                .ok_or(Notice::MustSpecifyPlayer),
        }
    }

    /// Identity whose attributes fill the menu's placeholders.
    pub fn resolve_placeholder(&self, name: &str) -> Result<Identity, Notice> {
        let identity = self.online(name)?;
        let as_sender = Sender::Actor(identity.clone());
        if self.permissions.has(&as_sender, &self.nodes.placeholders_exempt) {
            return Err(Notice::PlayerIsExempt {
                player: name.to_string(),
            });
        }
        Ok(identity)
    }

    fn online(&self, name: &str) -> Result<Identity, Notice> {
        self.identities
            .find_online_exact(name)
            .ok_or_else(|| Notice::PlayerNotOnline {
                player: name.to_string(),
            })
    }
}
