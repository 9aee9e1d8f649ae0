//! Data model shared by the binder, dispatcher and registry.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// An addressable actor: a sender, a viewer or a placeholder target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Whoever typed the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// A directly addressable actor that can itself view a menu.
    Actor(Identity),
    /// The host console. Can open menus for others but never for itself.
    Console,
}

impl Sender {
    pub fn actor(name: impl Into<String>) -> Self {
        Sender::Actor(Identity::new(name))
    }

    pub fn as_actor(&self) -> Option<&Identity> {
        match self {
            Sender::Actor(identity) => Some(identity),
            Sender::Console => None,
        }
    }

    pub fn is_actor(&self) -> bool {
        matches!(self, Sender::Actor(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Sender::Actor(identity) => &identity.name,
            Sender::Console => "console",
        }
    }
}

/// Ordered parameter names with optional defaults.
///
/// Declaration order matters: the first-declared parameter captures the
/// free-form tail of the typed tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterDeclaration {
    params: Vec<(String, Option<String>)>,
}

impl ParameterDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a declaration from `(name, default)` pairs, rejecting duplicates.
    pub fn from_pairs<I, N>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Option<String>)>,
        N: Into<String>,
    {
        let mut declaration = Self::new();
        for (name, default) in pairs {
            declaration.push(name, default)?;
        }
        Ok(declaration)
    }

    /// Append a parameter after the ones already declared.
    pub fn push(&mut self, name: impl Into<String>, default: Option<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Config("parameter name must not be empty".to_string()));
        }
        if self.contains(&name) {
            return Err(Error::Config(format!("duplicate parameter '{}'", name)));
        }
        self.params.push((name, default));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|(n, _)| n == name)
    }

    pub fn default_for(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, default)| default.as_deref())
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.params.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params.iter().map(|(n, d)| (n.as_str(), d.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Parameter values produced by a successful bind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArguments {
    values: BTreeMap<String, String>,
}

impl ResolvedArguments {
    pub(crate) fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.values
    }
}

/// A loaded menu as far as command handling is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDefinition {
    pub name: String,
    /// First entry is the primary command name, the rest are aliases.
    pub command_aliases: Vec<String>,
    pub parameters: ParameterDeclaration,
    pub usage_message: Option<String>,
    /// Whether a bound command should be created for this menu.
    pub register_command: bool,
}

impl MenuDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command_aliases: Vec::new(),
            parameters: ParameterDeclaration::new(),
            usage_message: None,
            register_command: true,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterDeclaration) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage_message = Some(usage.into());
        self
    }

    /// Name the bound command answers to.
    pub fn primary_command(&self) -> &str {
        self.command_aliases
            .first()
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    /// Declared aliases after the primary one.
    pub fn secondary_aliases(&self) -> &[String] {
        self.command_aliases.get(1..).unwrap_or(&[])
    }
}
