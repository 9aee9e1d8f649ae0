//! Tab-completion for the ad-hoc `open` command.

use super::dispatch::{Dispatcher, PLACEHOLDER_FLAG};
use super::types::Sender;

/// Subcommand word the ad-hoc entry point answers to.
pub const OPEN_COMMAND: &str = "open";

impl<'a> Dispatcher<'a> {
    /// Suggestions for the argument being typed.
    ///
    /// `args` starts with the subcommand word; the last element is the partial
    /// text under the cursor. `None` means "no suggestions".
    pub fn complete_open<S: AsRef<str>>(&self, sender: &Sender, args: &[S]) -> Option<Vec<String>> {
        if !self.permissions.has(sender, &self.nodes.open) {
            return None;
        }

        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_lowercase()).collect();

        match args.len() {
            0 => return Some(vec![OPEN_COMMAND.to_string()]),
            1 => {
                return OPEN_COMMAND
                    .starts_with(args[0].as_str())
                    .then(|| vec![OPEN_COMMAND.to_string()]);
            }
            2..=4 => {}
            _ => return None,
        }

        if args[0] != OPEN_COMMAND {
            return None;
        }

        let menu_names = self.catalog.list_all_names();
        if menu_names.is_empty() {
            return None;
        }

        if args.len() == 2 {
            return Some(filter_prefix(menu_names, &args[1]));
        }

        let online = self.identities.online_names();

        if args.len() == 3 {
            let typed = &args[2];
            if typed.is_empty() {
                let mut out = online;
                out.push(PLACEHOLDER_FLAG.to_string());
                return Some(out);
            }
            if !typed.starts_with('-') {
                return Some(filter_prefix(online, typed));
            }
            let flagged = online
                .into_iter()
                .map(|name| format!("{}{}", PLACEHOLDER_FLAG, name))
                .collect();
            return Some(filter_prefix(flagged, typed));
        }

        if !args[2].starts_with(PLACEHOLDER_FLAG) {
            return None;
        }
        Some(filter_prefix(online, &args[3]))
    }
}

/// Keep candidates starting with `typed`, ignoring case. `typed` is lower-case.
fn filter_prefix(candidates: Vec<String>, typed: &str) -> Vec<String> {
    if typed.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| c.to_lowercase().starts_with(typed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::PermissionNodes;
    use crate::core::types::MenuDefinition;
    use crate::host::memory::{
        BraceTemplater, IdentityRecord, InMemoryCatalog, InMemoryDirectory, RecordingSink,
    };

    fn complete(menus: Vec<MenuDefinition>, sender: &Sender, args: &[&str]) -> Option<Vec<String>> {
        let catalog = InMemoryCatalog::new(menus);
        let directory = InMemoryDirectory::new(
            vec![
                IdentityRecord::online("Steve", &["menudispatch.open"]),
                IdentityRecord::online("Alex", &[]),
                IdentityRecord::offline("Notch", &["menudispatch.open"]),
            ],
            &[],
        );
        let sink = RecordingSink::default();
        let dispatcher = Dispatcher {
            catalog: &catalog,
            identities: &directory,
            permissions: &directory,
            messages: &sink,
            templater: &BraceTemplater,
            nodes: PermissionNodes::for_namespace("menudispatch"),
        };
        dispatcher.complete_open(sender, args)
    }

    fn menus() -> Vec<MenuDefinition> {
        vec![
            MenuDefinition::new("shop"),
            MenuDefinition::new("Shields"),
            MenuDefinition::new("warps"),
        ]
    }

    fn steve() -> Sender {
        Sender::actor("Steve")
    }

    #[test]
    fn test_requires_permission() {
        assert_eq!(complete(menus(), &Sender::actor("Alex"), &["o"]), None);
    }

    #[test]
    fn test_first_position() {
        assert_eq!(complete(menus(), &steve(), &[]), Some(vec!["open".to_string()]));
        assert_eq!(complete(menus(), &steve(), &[""]), Some(vec!["open".to_string()]));
        assert_eq!(complete(menus(), &steve(), &["OP"]), Some(vec!["open".to_string()]));
        assert_eq!(complete(menus(), &steve(), &["x"]), None);
    }

    #[test]
    fn test_menu_names() {
        assert_eq!(
            complete(menus(), &steve(), &["open", "sh"]),
            Some(vec!["shop".to_string(), "Shields".to_string()])
        );
        assert_eq!(complete(menus(), &steve(), &["open", ""]).map(|v| v.len()), Some(3));
        assert_eq!(complete(menus(), &steve(), &["reload", "sh"]), None);
        assert_eq!(complete(vec![], &steve(), &["open", ""]), None);
    }

    #[test]
    fn test_third_position() {
        assert_eq!(
            complete(menus(), &steve(), &["open", "shop", ""]),
            Some(vec!["Steve".to_string(), "Alex".to_string(), "-p:".to_string()])
        );
        assert_eq!(
            complete(menus(), &steve(), &["open", "shop", "a"]),
            Some(vec!["Alex".to_string()])
        );
    }

    #[test]
    fn test_third_position_flag_forms_only() {
        assert_eq!(
            complete(menus(), &steve(), &["open", "shop", "-"]),
            Some(vec!["-p:Steve".to_string(), "-p:Alex".to_string()])
        );
        assert_eq!(
            complete(menus(), &steve(), &["open", "shop", "-p:st"]),
            Some(vec!["-p:Steve".to_string()])
        );
    }

    #[test]
    fn test_fourth_position() {
        assert_eq!(
            complete(menus(), &steve(), &["open", "shop", "-p:Alex", ""]),
            Some(vec!["Steve".to_string(), "Alex".to_string()])
        );
        assert_eq!(
            complete(menus(), &steve(), &["open", "shop", "-p:Alex", "s"]),
            Some(vec!["Steve".to_string()])
        );
        assert_eq!(complete(menus(), &steve(), &["open", "shop", "Alex", ""]), None);
        assert_eq!(
            complete(menus(), &steve(), &["open", "shop", "-p:Alex", "Steve", ""]),
            None
        );
    }
}
