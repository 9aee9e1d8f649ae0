//! User-facing rejections.
//!
//! A notice aborts a dispatch cleanly. It is rendered by the message sink,
//! either from a configured template or from the built-in default.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoPermission,
    WrongUsage,
    NoMenusLoaded,
    InvalidMenu { menu: String },
    PlayerNotOnline { player: String },
    PlayerIsExempt { player: String },
    MustSpecifyPlayer,
    PlayersOnly,
    /// Bound command arguments did not bind. `usage` is already rendered.
    Usage { usage: Option<String> },
}

impl Notice {
    /// Template key used to look up overrides in settings.
    pub fn key(&self) -> &'static str {
        match self {
            Notice::NoPermission => "no_permission",
            Notice::WrongUsage => "wrong_usage_open_command",
            Notice::NoMenusLoaded => "no_menus_loaded",
            Notice::InvalidMenu { .. } => "invalid_menu",
            Notice::PlayerNotOnline { .. } => "player_is_not_online",
            Notice::PlayerIsExempt { .. } => "player_is_exempt",
            Notice::MustSpecifyPlayer => "must_specify_player",
            Notice::PlayersOnly => "players_only",
            Notice::Usage { .. } => "usage",
        }
    }

    pub fn default_template(&self) -> &'static str {
        match self {
            Notice::NoPermission => "You don't have permission to do that!",
            Notice::WrongUsage => "Incorrect usage! open <menu> [player] [-p:<player>] [args...]",
            Notice::NoMenusLoaded => "There are no menus loaded.",
            Notice::InvalidMenu { .. } => "Could not find menu: {menu}",
            Notice::PlayerNotOnline { .. } => "Player: {player} is not online!",
            Notice::PlayerIsExempt { .. } => {
                "Player: {player} is exempt from placeholders being used in menus!"
            }
            Notice::MustSpecifyPlayer => "You must specify a player to open a menu for!",
            Notice::PlayersOnly => "Menus can only be opened by players!",
            Notice::Usage { .. } => "{usage}",
        }
    }

    pub fn substitutions(&self) -> Vec<(&'static str, &str)> {
        match self {
            Notice::InvalidMenu { menu } => vec![("menu", menu.as_str())],
            Notice::PlayerNotOnline { player } | Notice::PlayerIsExempt { player } => {
                vec![("player", player.as_str())]
            }
            Notice::Usage { usage } => vec![("usage", usage.as_deref().unwrap_or(""))],
            _ => Vec::new(),
        }
    }

    /// Fill `template` with this notice's substitutions.
    pub fn render(&self, template: &str) -> String {
        self.substitutions()
            .into_iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{}}}", name), value)
            })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.default_template()))
    }
}
