//! Positional argument binding.
//!
//! Parameters are walked in reverse declaration order against the typed
//! tokens from the front. The last parameter walked (the first declared)
//! swallows every remaining token, so a declaration like
//! `[description, amount, item]` reads `item amount free text...`.

use std::collections::BTreeMap;

use thiserror::Error;

use super::types::{ParameterDeclaration, ResolvedArguments};

/// What to do when a parameter has neither a token nor a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Leave the parameter out of the result.
    OmitMissing,
    /// Fail the whole bind, carrying the usage message to show.
    AbortOnMissing { usage: Option<String> },
}

/// A required parameter had no token and no default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing value for parameter '{parameter}'")]
pub struct BindingFailure {
    pub parameter: String,
    pub usage: Option<String>,
}

/// Bind `tokens` to `declaration`.
///
/// With `blank_is_missing`, a blank token falls back to the parameter's
/// default when it has one. A blank token without a default is kept as typed.
pub fn bind<S: AsRef<str>>(
    declaration: &ParameterDeclaration,
    tokens: &[S],
    policy: &MissingPolicy,
    blank_is_missing: bool,
) -> Result<ResolvedArguments, BindingFailure> {
    let mut values = BTreeMap::new();
    if declaration.is_empty() {
        return Ok(ResolvedArguments::from_map(values));
    }

    let names: Vec<&str> = declaration.names().rev().collect();
    let last = names.len() - 1;

    for (index, name) in names.iter().copied().enumerate() {
        let default = declaration.default_for(name);

        let typed = if index < tokens.len() {
            if index == last {
                Some(join_tail(&tokens[index..]))
            } else {
                Some(tokens[index].as_ref().to_string())
            }
        } else {
            None
        };

        let value = match typed {
            Some(v) if blank_is_missing && v.trim().is_empty() && default.is_some() => {
                tracing::trace!("Using default for blank arg: {} => {:?}", name, default);
                default.map(str::to_string)
            }
            Some(v) => Some(v),
            None => {
                if default.is_some() {
                    tracing::trace!("Using default for missing arg: {} => {:?}", name, default);
                }
                default.map(str::to_string)
            }
        };

        match value {
            Some(v) => {
                tracing::trace!("arg: {} => {}", name, v);
                values.insert(name.to_string(), v);
            }
            None => match policy {
                MissingPolicy::AbortOnMissing { usage } => {
                    return Err(BindingFailure {
                        parameter: name.to_string(),
                        usage: usage.clone(),
                    });
                }
                MissingPolicy::OmitMissing => {
                    tracing::trace!("Omitting missing arg: {}", name);
                }
            },
        }

        if index == last && index < tokens.len() {
            break;
        }
    }

    Ok(ResolvedArguments::from_map(values))
}

fn join_tail<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
}
