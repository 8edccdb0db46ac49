//! Environments and placeholder substitution.
//!
//! Requests are authored as templates: the URL, header values, and the
//! string leaves of a protobuf body may contain `{{name}}` placeholders
//! that get substituted from the active [`Environment`] right before
//! dispatch. Substitution is one left-to-right pass; replacement values
//! go in verbatim and are never re-scanned for further placeholders.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `{{name}}`, tolerating whitespace inside the braces.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_-]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// What substitution does with a placeholder that has no mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Leave the placeholder in the text untouched.
    #[default]
    Keep,
    /// Replace the placeholder with the empty string.
    Empty,
    /// Fail the substitution, naming the variable.
    Error,
}

/// A named set of variables, as the user edits it.
///
/// Entries keep their order for display. For substitution the set
/// flattens to a map where the last occurrence of a duplicated name
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Display name, e.g. `staging`.
    pub name: String,
    /// Ordered variable entries.
    pub vars: Vec<(String, String)>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
        }
    }

    /// Append a variable entry.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((name.into(), value.into()));
        self
    }

    /// Flatten to a substitution map. Last occurrence of a name wins.
    pub fn var_map(&self) -> HashMap<String, String> {
        self.vars.iter().cloned().collect()
    }
}

/// A placeholder with no mapping, raised under [`UnresolvedPolicy::Error`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unresolved variable: {0}")]
pub struct UnresolvedVar(pub String);

/// Replace every `{{name}}` placeholder in `text` from `vars`.
///
/// # Errors
///
/// Returns [`UnresolvedVar`] for the first unmapped placeholder, only
/// under [`UnresolvedPolicy::Error`].
pub fn apply_vars(
    text: &str,
    vars: &HashMap<String, String>,
    policy: UnresolvedPolicy,
) -> Result<String, UnresolvedVar> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let name = &caps[1];
        out.push_str(&text[last..whole.start()]);
        match vars.get(name) {
            Some(value) => out.push_str(value),
            None => match policy {
                UnresolvedPolicy::Keep => out.push_str(whole.as_str()),
                UnresolvedPolicy::Empty => {}
                UnresolvedPolicy::Error => return Err(UnresolvedVar(name.to_string())),
            },
        }
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}
