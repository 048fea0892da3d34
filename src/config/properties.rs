//! Flat property sources.
//!
//! A [`PropertySource`] is an ordered map from canonical dotted keys to raw
//! string values. Keys are canonicalized on the way in so that
//! `maxConnections`, `max-connections` and `max_connections` all address the
//! same property. List elements keep their index suffix (`formats[0]`).
//!
//! Sources can be parsed from `.properties` text, TOML documents, environment
//! variables and `KEY=VALUE` command-line overrides, then layered with
//! [`PropertySource::merge`].

use std::collections::{BTreeMap, HashMap};

use crate::config::error::ConfigError;

/// Canonical form of a dotted property key.
///
/// Each segment is lower-cased with `-` and `_` removed; a trailing `[n]`
/// index is kept verbatim.
pub fn canonical_key(raw: &str) -> String {
    raw.trim()
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (name, index) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };
            let mut out: String = name
                .chars()
                .filter(|c| *c != '-' && *c != '_')
                .flat_map(char::to_lowercase)
                .collect();
            out.push_str(index.trim());
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// A flat, canonicalized key/value property map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySource {
    entries: BTreeMap<String, String>,
}

impl PropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, replacing any previous value for the same canonical key.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = canonical_key(key.as_ref());
        if key.is_empty() {
            return;
        }
        self.entries.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&canonical_key(key)).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&canonical_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The properties under `prefix`, with the prefix stripped.
    pub fn scoped(&self, prefix: &str) -> PropertySource {
        let prefix = canonical_key(prefix);
        if prefix.is_empty() {
            return self.clone();
        }
        let dotted = format!("{}.", prefix);
        let entries = self
            .entries
            .range(dotted.clone()..)
            .take_while(|(key, _)| key.starts_with(&dotted))
            .map(|(key, value)| (key[dotted.len()..].to_string(), value.clone()))
            .collect();
        PropertySource { entries }
    }

    /// Elements written as `key[n]`, ordered by index.
    pub fn indexed(&self, key: &str) -> Vec<(usize, &str)> {
        let base = format!("{}[", canonical_key(key));
        let mut items: Vec<(usize, &str)> = self
            .entries
            .range(base.clone()..)
            .take_while(|(k, _)| k.starts_with(&base))
            .filter_map(|(k, v)| {
                let index = k[base.len()..].strip_suffix(']')?;
                Some((index.trim().parse::<usize>().ok()?, v.as_str()))
            })
            .collect();
        items.sort_by_key(|(index, _)| *index);
        items
    }

    /// Overlay `other` on top of this source; its values win.
    ///
    /// A list set in `other`, whether delimited or indexed, replaces the
    /// whole list underneath rather than merging element by element.
    pub fn merge(&mut self, other: PropertySource) {
        self.overlay(other, &[]);
    }

    /// Like [`merge`](Self::merge), treating each group of `synonyms` as one
    /// property: setting any spelling in `other` clears every spelling here.
    pub fn overlay(&mut self, other: PropertySource, synonyms: &[Vec<String>]) {
        let mut replaced: Vec<String> = Vec::new();
        for key in other.entries.keys() {
            let base = list_base(key);
            let group = synonyms
                .iter()
                .find(|group| group.iter().any(|alias| canonical_key(alias) == base));
            match group {
                Some(group) => replaced.extend(group.iter().map(|alias| canonical_key(alias))),
                None => replaced.push(base.to_string()),
            }
        }
        replaced.sort();
        replaced.dedup();

        for base in &replaced {
            self.remove_property(base);
        }
        self.entries.extend(other.entries);
    }

    /// Drop `base` and every indexed element beneath it.
    fn remove_property(&mut self, base: &str) {
        self.entries.retain(|key, _| {
            !matches!(key.strip_prefix(base), Some(rest) if rest.is_empty() || rest.starts_with('['))
        });
    }

    /// Parse `.properties` text.
    ///
    /// Supports `key=value` and `key: value`, `#`/`!` comment lines, and
    /// continuation lines ending in a backslash.
    pub fn parse_properties(text: &str) -> Result<Self, ConfigError> {
        let mut source = PropertySource::new();
        let mut pending = String::new();
        let mut start_line = 0;

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();
            if pending.is_empty() {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                start_line = idx + 1;
            }

            match trimmed.strip_suffix('\\') {
                Some(head) => {
                    pending.push_str(head);
                    continue;
                }
                None => pending.push_str(trimmed),
            }

            let logical = std::mem::take(&mut pending);
            let (key, value) = split_property_line(&logical).ok_or_else(|| {
                ConfigError::ParseProperties {
                    line: start_line,
                    message: format!("expected 'key=value', found '{}'", logical.trim()),
                }
            })?;
            source.insert(key, value);
        }

        if !pending.is_empty() {
            return Err(ConfigError::ParseProperties {
                line: start_line,
                message: "unterminated line continuation".to_string(),
            });
        }

        Ok(source)
    }

    /// Parse a TOML document, flattening tables into dotted keys.
    ///
    /// Arrays of scalars become indexed keys; arrays of tables are flattened
    /// element by element (`items[0].name`).
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = text.parse()?;
        let mut source = PropertySource::new();
        for (key, value) in &table {
            flatten_toml(&mut source, key, value);
        }
        Ok(source)
    }

    /// Map environment variables onto dotted keys.
    ///
    /// `APP_CONFIG_DATABASE_URL` becomes `app.config.database.url` and numeric
    /// segments become list indices (`APP_CONFIG_RATES_0` → `app.config.rates[0]`).
    pub fn from_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut source = PropertySource::new();
        for (name, value) in vars {
            let mut key = String::new();
            for segment in name.as_ref().split('_').filter(|s| !s.is_empty()) {
                if segment.chars().all(|c| c.is_ascii_digit()) && !key.is_empty() {
                    key.push('[');
                    key.push_str(segment);
                    key.push(']');
                } else {
                    if !key.is_empty() {
                        key.push('.');
                    }
                    key.push_str(&segment.to_ascii_lowercase());
                }
            }
            source.insert(key, value);
        }
        source
    }

    /// Parse `KEY=VALUE` overrides as given on the command line.
    pub fn from_overrides<I, S>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut source = PropertySource::new();
        for (idx, raw) in overrides.into_iter().enumerate() {
            let raw = raw.as_ref();
            let (key, value) = raw
                .trim_start_matches("--")
                .split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| ConfigError::ParseProperties {
                    line: idx + 1,
                    message: format!("override '{}' is not of the form KEY=VALUE", raw),
                })?;
            source.insert(key, value);
        }
        Ok(source)
    }
}

/// The property a key belongs to: everything before its first list index.
fn list_base(key: &str) -> &str {
    key.find('[').map_or(key, |pos| &key[..pos])
}

fn split_property_line(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}

fn flatten_toml(source: &mut PropertySource, key: &str, value: &toml::Value) {
    match value {
        toml::Value::Table(table) => {
            for (child, value) in table {
                flatten_toml(source, &format!("{}.{}", key, child), value);
            }
        }
        toml::Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_toml(source, &format!("{}[{}]", key, idx), item);
            }
        }
        toml::Value::String(s) => source.insert(key, s.clone()),
        other => source.insert(key, other.to_string()),
    }
}

impl<K, V> FromIterator<(K, V)> for PropertySource
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = PropertySource::new();
        for (key, value) in iter {
            source.insert(key, value);
        }
        source
    }
}

impl From<HashMap<String, String>> for PropertySource {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for PropertySource {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}
