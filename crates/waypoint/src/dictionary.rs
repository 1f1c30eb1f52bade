// File: src/dictionary.rs
// Purpose: Localized strings with {placeholder} interpolation

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;
use waypoint_router::params::param_text;
use waypoint_router::RouteParams;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_\.]*)\}").expect("placeholder pattern is valid"));

/// Strings for one language
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    language: String,
    entries: HashMap<String, String>,
}

impl Dictionary {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            entries: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }

    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The entry for `key` with `{name}` placeholders filled from `params`.
    ///
    /// Unknown keys come back as the key itself; unknown placeholders are
    /// left in place.
    pub fn get(&self, key: &str, params: &RouteParams) -> String {
        match self.entries.get(key) {
            Some(text) => interpolate(text, params),
            None => {
                warn!(key, language = %self.language, "missing dictionary entry");
                key.to_string()
            }
        }
    }
}

fn interpolate(text: &str, params: &RouteParams) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            lookup(params, name)
                .and_then(|value| param_text(value).map(|text| text.into_owned()))
                .unwrap_or_else(|| format!("{{{}}}", name))
        })
        .into_owned()
}

fn lookup<'a>(params: &'a RouteParams, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = params.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
