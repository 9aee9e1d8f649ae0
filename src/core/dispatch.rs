//! Menu open dispatch.
//!
//! Two entry points share the identity and binding logic:
//! - `open [-p:<identity>] <menu> [target] [args...]`, typed by anyone with
//!   the open permission (the `-p:` token may appear anywhere);
//! - one bound command per menu, which always opens for the sender.

use crate::host::{IdentityDirectory, MenuCatalog, MessageSink, PermissionChecker, TextTemplater};

use super::binder::{bind, MissingPolicy};
use super::identity::{IdentityResolver, PermissionNodes};
use super::notice::Notice;
use super::types::{Identity, ResolvedArguments, Sender};

/// Prefix marking the placeholder identity token.
pub const PLACEHOLDER_FLAG: &str = "-p:";

/// Result of a dispatch that did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Opened {
        menu: String,
        viewer: Identity,
        placeholder: Option<Identity>,
        arguments: Option<ResolvedArguments>,
    },
    Rejected(Notice),
}

impl Dispatch {
    pub fn is_opened(&self) -> bool {
        matches!(self, Dispatch::Opened { .. })
    }
}

/// Everything a dispatch needs from the host.
pub struct Dispatcher<'a> {
    pub catalog: &'a dyn MenuCatalog,
    pub identities: &'a dyn IdentityDirectory,
    pub permissions: &'a dyn PermissionChecker,
    pub messages: &'a dyn MessageSink,
    pub templater: &'a dyn TextTemplater,
    pub nodes: PermissionNodes,
}

impl<'a> Dispatcher<'a> {
    pub fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(self.identities, self.permissions, &self.nodes)
    }

    /// The ad-hoc `open` command. `tokens` excludes the `open` word itself.
    pub fn open_ad_hoc<S: AsRef<str>>(&self, sender: &Sender, tokens: &[S]) -> Dispatch {
        self.report(sender, self.try_open_ad_hoc(sender, tokens))
    }

    fn try_open_ad_hoc<S: AsRef<str>>(
        &self,
        sender: &Sender,
        tokens: &[S],
    ) -> Result<Dispatch, Notice> {
        let resolver = self.resolver();
        resolver.require_open(sender)?;

        if self.catalog.is_empty() {
            return Err(Notice::NoMenusLoaded);
        }

        let (placeholder_name, rest) = self.split_placeholder_flag(sender, tokens)?;

        let mut rest = rest.into_iter();
        let menu_name = rest.next().ok_or(Notice::WrongUsage)?;
        let target = rest.next();
        let trailing: Vec<&str> = rest.collect();

        let menu = self
            .catalog
            .find_by_name(menu_name)
            .ok_or_else(|| Notice::InvalidMenu {
                menu: menu_name.to_string(),
            })?;

        let viewer = resolver.resolve_viewer(sender, target)?;

        let placeholder = match placeholder_name {
            Some(name) => Some(resolver.resolve_placeholder(name)?),
            None => None,
        };

        let definition = menu.definition();
        let arguments = if definition.parameters.is_empty() {
            None
        } else {
            // OmitMissing never fails.
            bind(
                &definition.parameters,
                trailing.as_slice(),
                &MissingPolicy::OmitMissing,
                false,
            )
            .ok()
        };

        tracing::debug!(
            "{} opening menu {} for {} (placeholder: {:?})",
            sender.name(),
            definition.name,
            viewer,
            placeholder.as_ref().map(|p| p.name.as_str())
        );
        menu.open_menu(&viewer, arguments.clone(), placeholder.as_ref());

        Ok(Dispatch::Opened {
            menu: definition.name.clone(),
            viewer,
            placeholder,
            arguments,
        })
    }

    /// Pull every `-p:<name>` token out of `tokens`. The last one wins.
    fn split_placeholder_flag<'t, S: AsRef<str>>(
        &self,
        sender: &Sender,
        tokens: &'t [S],
    ) -> Result<(Option<&'t str>, Vec<&'t str>), Notice> {
        let mut placeholder = None;
        let mut rest = Vec::with_capacity(tokens.len());

        for token in tokens {
            let token: &str = token.as_ref();
            match token.strip_prefix(PLACEHOLDER_FLAG) {
                Some(name) => {
                    self.resolver().require_placeholders(sender)?;
                    placeholder = Some(name);
                }
                None => rest.push(token),
            }
        }

        Ok((placeholder, rest))
    }

    /// A bound menu command. `menu_name` is looked up on every call.
    pub fn open_bound<S: AsRef<str>>(
        &self,
        sender: &Sender,
        menu_name: &str,
        tokens: &[S],
    ) -> Dispatch {
        self.report(sender, self.try_open_bound(sender, menu_name, tokens))
    }

    fn try_open_bound<S: AsRef<str>>(
        &self,
        sender: &Sender,
        menu_name: &str,
        tokens: &[S],
    ) -> Result<Dispatch, Notice> {
        let viewer = sender.as_actor().ok_or(Notice::PlayersOnly)?;

        let menu = self.catalog.find_by_name(menu_name).ok_or_else(|| {
            tracing::warn!("Bound command points at missing menu {}", menu_name);
            Notice::InvalidMenu {
                menu: menu_name.to_string(),
            }
        })?;
        let definition = menu.definition();

        let arguments = if definition.parameters.is_empty() {
            None
        } else {
            let policy = MissingPolicy::AbortOnMissing {
                usage: definition.usage_message.clone(),
            };
            let bound = bind(&definition.parameters, tokens, &policy, true).map_err(|failure| {
                tracing::debug!("Menu {}: {}", definition.name, failure);
                Notice::Usage {
                    usage: failure
                        .usage
                        .map(|usage| self.templater.render(&usage, viewer)),
                }
            })?;
            Some(bound)
        };

        tracing::debug!("Opening menu: {}", definition.name);
        menu.open_menu(viewer, arguments.clone(), None);

        Ok(Dispatch::Opened {
            menu: definition.name.clone(),
            viewer: viewer.clone(),
            placeholder: None,
            arguments,
        })
    }

    fn report(&self, sender: &Sender, outcome: Result<Dispatch, Notice>) -> Dispatch {
        match outcome {
            Ok(dispatch) => dispatch,
            Err(notice) => {
                // A usage failure without a configured message stays silent.
                if notice != (Notice::Usage { usage: None }) {
                    self.messages.send(sender, &notice);
                }
                Dispatch::Rejected(notice)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MenuDefinition, ParameterDeclaration};
    use crate::host::memory::{
        BraceTemplater, IdentityRecord, InMemoryCatalog, InMemoryDirectory, RecordingSink,
    };

    struct Fixture {
        catalog: InMemoryCatalog,
        directory: InMemoryDirectory,
        sink: RecordingSink,
        templater: BraceTemplater,
    }

    impl Fixture {
        fn new(menus: Vec<MenuDefinition>) -> Self {
            let directory = InMemoryDirectory::new(
                vec![
                    IdentityRecord::online(
                        "Steve",
                        &[
                            "menudispatch.open",
                            "menudispatch.open.others",
                            "menudispatch.placeholdersfor",
                        ],
                    ),
                    IdentityRecord::online("Alex", &["menudispatch.open"]),
                    IdentityRecord::online("Herobrine", &["menudispatch.placeholdersfor.exempt"]),
                ],
                &["menudispatch.*"],
            );
            Self {
                catalog: InMemoryCatalog::new(menus),
                directory,
                sink: RecordingSink::default(),
                templater: BraceTemplater,
            }
        }

        fn dispatcher(&self) -> Dispatcher<'_> {
            Dispatcher {
                catalog: &self.catalog,
                identities: &self.directory,
                permissions: &self.directory,
                messages: &self.sink,
                templater: &self.templater,
                nodes: PermissionNodes::for_namespace("menudispatch"),
            }
        }
    }

    fn shop() -> MenuDefinition {
        let params =
            ParameterDeclaration::from_pairs([("amount", Some("1".to_string())), ("item", None)])
                .unwrap();
        MenuDefinition::new("shop")
            .with_aliases(["shop", "store"])
            .with_parameters(params)
            .with_usage("Usage: /shop <item> [amount], {player}")
    }

    #[test]
    fn test_ad_hoc_opens_for_self_with_arguments() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx
            .dispatcher()
            .open_ad_hoc(&Sender::actor("Steve"), &["shop", "Steve", "diamond"]);

        match out {
            Dispatch::Opened {
                menu,
                viewer,
                placeholder,
                arguments,
            } => {
                assert_eq!(menu, "shop");
                assert_eq!(viewer.name, "Steve");
                assert!(placeholder.is_none());
                let args = arguments.unwrap();
                assert_eq!(args.get("item"), Some("diamond"));
                assert_eq!(args.get("amount"), Some("1"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fx.catalog.opens_of("shop").len(), 1);
        assert!(fx.sink.sent().is_empty());
    }

    #[test]
    fn test_ad_hoc_requires_open_permission() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx.dispatcher().open_ad_hoc(&Sender::actor("Herobrine"), &["shop"]);
        assert_eq!(out, Dispatch::Rejected(Notice::NoPermission));
        assert_eq!(fx.sink.sent().len(), 1);
    }

    #[test]
    fn test_ad_hoc_no_menus_loaded() {
        let fx = Fixture::new(vec![]);
        let out = fx.dispatcher().open_ad_hoc(&Sender::actor("Steve"), &["shop"]);
        assert_eq!(out, Dispatch::Rejected(Notice::NoMenusLoaded));
    }

    #[test]
    fn test_ad_hoc_wrong_usage_and_invalid_menu() {
        let fx = Fixture::new(vec![shop()]);
        let d = fx.dispatcher();
        let empty: [&str; 0] = [];
        assert_eq!(
            d.open_ad_hoc(&Sender::actor("Steve"), &empty),
            Dispatch::Rejected(Notice::WrongUsage)
        );
        assert_eq!(
            d.open_ad_hoc(&Sender::actor("Steve"), &["-p:Alex"]),
            Dispatch::Rejected(Notice::WrongUsage)
        );
        assert_eq!(
            d.open_ad_hoc(&Sender::actor("Steve"), &["warps"]),
            Dispatch::Rejected(Notice::InvalidMenu {
                menu: "warps".to_string()
            })
        );
        assert_eq!(
            fx.sink.sent().last().map(|m| m.text.clone()),
            Some("Could not find menu: warps".to_string())
        );
    }

    #[test]
    fn test_placeholder_flag_without_permission() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx
            .dispatcher()
            .open_ad_hoc(&Sender::actor("Alex"), &["shop", "-p:Steve", "diamond"]);
        assert_eq!(out, Dispatch::Rejected(Notice::NoPermission));
        assert!(fx.catalog.opens_of("shop").is_empty());
    }

    #[test]
    fn test_placeholder_flag_is_stripped_anywhere() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx.dispatcher().open_ad_hoc(
            &Sender::actor("Steve"),
            &["shop", "Alex", "-p:alex", "gold", "ingot"],
        );
        match out {
            Dispatch::Opened {
                viewer,
                placeholder,
                arguments,
                ..
            } => {
                assert_eq!(viewer.name, "Alex");
                assert_eq!(placeholder.unwrap().name, "Alex");
                let args = arguments.unwrap();
                assert_eq!(args.get("item"), Some("gold"));
                assert_eq!(args.get("amount"), Some("ingot"));
            }
            other => panic!("unexpected {:?}", other),
        }
        let opens = fx.catalog.opens_of("shop");
        assert_eq!(opens[0].placeholder.as_deref(), Some("Alex"));
    }

    #[test]
    fn test_placeholder_exempt_and_offline() {
        let fx = Fixture::new(vec![shop()]);
        let d = fx.dispatcher();
        assert_eq!(
            d.open_ad_hoc(&Sender::actor("Steve"), &["-p:Herobrine", "shop"]),
            Dispatch::Rejected(Notice::PlayerIsExempt {
                player: "Herobrine".to_string()
            })
        );
        assert_eq!(
            d.open_ad_hoc(&Sender::actor("Steve"), &["shop", "-p:Ghost"]),
            Dispatch::Rejected(Notice::PlayerNotOnline {
                player: "Ghost".to_string()
            })
        );
        assert!(fx.catalog.opens_of("shop").is_empty());
    }

    #[test]
    fn test_console_must_name_target() {
        let fx = Fixture::new(vec![shop()]);
        let d = fx.dispatcher();
        assert_eq!(
            d.open_ad_hoc(&Sender::Console, &["shop"]),
            Dispatch::Rejected(Notice::MustSpecifyPlayer)
        );
        assert!(d.open_ad_hoc(&Sender::Console, &["shop", "Alex"]).is_opened());
    }

    #[test]
    fn test_open_others_permission() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx
            .dispatcher()
            .open_ad_hoc(&Sender::actor("Alex"), &["shop", "Steve"]);
        assert_eq!(out, Dispatch::Rejected(Notice::NoPermission));
    }

    #[test]
    fn test_ad_hoc_without_declared_parameters_passes_none() {
        let fx = Fixture::new(vec![MenuDefinition::new("warps")]);
        let out = fx
            .dispatcher()
            .open_ad_hoc(&Sender::actor("Steve"), &["warps", "Steve", "ignored"]);
        match out {
            Dispatch::Opened { arguments, .. } => assert!(arguments.is_none()),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fx.catalog.opens_of("warps").len(), 1);
    }

    #[test]
    fn test_bound_opens_for_sender() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx
            .dispatcher()
            .open_bound(&Sender::actor("Alex"), "shop", &["diamond", "64"]);
        match out {
            Dispatch::Opened {
                viewer, arguments, ..
            } => {
                assert_eq!(viewer.name, "Alex");
                let args = arguments.unwrap();
                assert_eq!(args.get("item"), Some("diamond"));
                assert_eq!(args.get("amount"), Some("64"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fx.catalog.opens_of("shop")[0].viewer, "Alex");
    }

    #[test]
    fn test_bound_blank_tail_falls_back_to_default() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx
            .dispatcher()
            .open_bound(&Sender::actor("Alex"), "shop", &["diamond", ""]);
        match out {
            Dispatch::Opened { arguments, .. } => {
                assert_eq!(arguments.unwrap().get("amount"), Some("1"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bound_missing_argument_sends_usage() {
        let fx = Fixture::new(vec![shop()]);
        let empty: [&str; 0] = [];
        let out = fx
            .dispatcher()
            .open_bound(&Sender::actor("Alex"), "shop", &empty);
        assert_eq!(
            out,
            Dispatch::Rejected(Notice::Usage {
                usage: Some("Usage: /shop <item> [amount], Alex".to_string())
            })
        );
        assert_eq!(fx.sink.sent().len(), 1);
        assert!(fx.catalog.opens_of("shop").is_empty());
    }

    #[test]
    fn test_bound_missing_argument_without_usage_is_silent() {
        let params = ParameterDeclaration::from_pairs([("target", None::<String>)]).unwrap();
        let menu = MenuDefinition::new("profile").with_parameters(params);
        let fx = Fixture::new(vec![menu]);
        let empty: [&str; 0] = [];
        let out = fx
            .dispatcher()
            .open_bound(&Sender::actor("Steve"), "profile", &empty);
        assert_eq!(out, Dispatch::Rejected(Notice::Usage { usage: None }));
        assert!(fx.sink.sent().is_empty());
    }

    #[test]
    fn test_bound_rejects_console() {
        let fx = Fixture::new(vec![shop()]);
        let out = fx.dispatcher().open_bound(&Sender::Console, "shop", &["x"]);
        assert_eq!(out, Dispatch::Rejected(Notice::PlayersOnly));
        assert_eq!(
            fx.sink.sent()[0].text,
            "Menus can only be opened by players!"
        );
    }
}
