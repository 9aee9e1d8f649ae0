//! Configuration loading for menudispatch.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::core::types::{MenuDefinition, ParameterDeclaration};
use crate::error::{Error, Result};

/// Get the menudispatch home directory (~/.menudispatch).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".menudispatch"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.menudispatch/settings.json
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load and validate settings from `path`.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    validate_settings(&settings)?;

    tracing::debug!(
        "Loaded {} menu(s) from {}",
        settings.menus.len(),
        path.display()
    );
    Ok(settings)
}

pub(crate) fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.namespace.trim().is_empty() {
        return Err(Error::Config("namespace must not be empty".to_string()));
    }

    let mut seen = HashSet::new();
    for menu in &settings.menus {
        if menu.name.trim().is_empty() {
            return Err(Error::Config("menu name must not be empty".to_string()));
        }
        if !seen.insert(menu.name.as_str()) {
            return Err(Error::Config(format!("duplicate menu '{}'", menu.name)));
        }
        menu.to_definition()
            .map_err(|e| Error::Config(format!("menu '{}': {}", menu.name, e)))?;
    }
    Ok(())
}

fn default_namespace() -> String {
    "menudispatch".to_string()
}

fn default_console_permissions() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

/// A declared menu argument.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ArgumentConfig {
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
}

/// Menu configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MenuConfig {
    pub name: String,
    /// Command names; the first is the primary one.
    #[serde(default)]
    pub commands: Vec<String>,
    /// Arguments in declaration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentConfig>,
    #[serde(default)]
    pub args_usage_message: Option<String>,
    #[serde(default = "default_true")]
    pub register_command: bool,
}

impl MenuConfig {
    pub fn to_definition(&self) -> Result<MenuDefinition> {
        let parameters = ParameterDeclaration::from_pairs(
            self.arguments
                .iter()
                .map(|a| (a.name.clone(), a.default.clone())),
        )?;
        let mut definition = MenuDefinition::new(self.name.clone())
            .with_aliases(self.commands.iter().cloned())
            .with_parameters(parameters);
        definition.usage_message = self.args_usage_message.clone();
        definition.register_command = self.register_command;
        Ok(definition)
    }
}

/// Identity configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IdentityConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub online: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// menudispatch settings.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    /// Fallback command prefix and permission root.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub menus: Vec<MenuConfig>,

    #[serde(default)]
    pub identities: Vec<IdentityConfig>,

    #[serde(default = "default_console_permissions")]
    pub console_permissions: Vec<String>,

    /// Message template overrides keyed by notice key.
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            menus: Vec::new(),
            identities: Vec::new(),
            console_permissions: default_console_permissions(),
            messages: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn menu_definitions(&self) -> Result<Vec<MenuDefinition>> {
        self.menus.iter().map(MenuConfig::to_definition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "namespace": "Menus",
        "menus": [
            {
                "name": "shop",
                "commands": ["shop", "store"],
                "arguments": [
                    {"name": "amount", "default": "1"},
                    {"name": "item"}
                ],
                "args_usage_message": "/shop <item> [amount]"
            },
            {"name": "warps", "register_command": false}
        ],
        "identities": [
            {"name": "Steve", "permissions": ["menus.open"]},
            {"name": "Notch", "online": false}
        ]
    }"#;

    #[test]
    fn test_load_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.namespace, "Menus");
        assert_eq!(settings.console_permissions, vec!["*".to_string()]);
        assert!(!settings.identities[1].online);

        let menus = settings.menu_definitions().unwrap();
        assert_eq!(menus[0].primary_command(), "shop");
        let names: Vec<&str> = menus[0].parameters.names().collect();
        assert_eq!(names, vec!["amount", "item"]);
        assert_eq!(menus[0].parameters.default_for("amount"), Some("1"));
        assert!(!menus[1].register_command);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_settings_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_duplicate_argument() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"menus": [{"name": "m", "arguments": [{"name": "a"}, {"name": "a"}]}]}"#,
        )
        .unwrap();
        assert!(matches!(load_settings_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_menu() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"menus": [{"name": "m"}, {"name": "m"}]}"#).unwrap();
        assert!(matches!(load_settings_from(&path), Err(Error::Config(_))));
    }
}
