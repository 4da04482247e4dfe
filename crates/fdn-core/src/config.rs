//! Typed access to sectioned `key = value` configuration files.
//!
//! Files keep the familiar INI layout (`[section]` headers followed by
//! `key = value` lines) but values use TOML syntax. Sections only group keys
//! for readability: every key lives in one flat namespace and may be defined
//! once.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Value;

use crate::errors::{ErrorInfo, PopulateError};

const TRUE_WORDS: [&str; 4] = ["1", "yes", "true", "on"];
const FALSE_WORDS: [&str; 4] = ["0", "no", "false", "off"];

/// Flattened configuration store with typed, coercing accessors.
///
/// Instances are plain values: deriving a variant for a run goes through
/// [`ConfigParser::with_overrides`], which leaves the receiver untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConfigParser {
    #[serde(skip)]
    source: Option<PathBuf>,
    values: BTreeMap<String, Value>,
}

impl ConfigParser {
    /// Reads and parses the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PopulateError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            PopulateError::Config(
                ErrorInfo::new("config-read", "failed to read configuration file")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let mut parser = Self::parse_with_source(&contents, Some(path))?;
        parser.source = Some(path.to_path_buf());
        Ok(parser)
    }

    /// Parses configuration text held in memory.
    pub fn parse(text: &str) -> Result<Self, PopulateError> {
        Self::parse_with_source(text, None)
    }

    fn parse_with_source(text: &str, source: Option<&Path>) -> Result<Self, PopulateError> {
        let with_source = |info: ErrorInfo| match source {
            Some(path) => info.with_context("path", path.display().to_string()),
            None => info,
        };
        let table: toml::Table = text.parse().map_err(|err: toml::de::Error| {
            PopulateError::Config(with_source(
                ErrorInfo::new("config-parse", "configuration is not valid")
                    .with_hint(err.to_string()),
            ))
        })?;

        let mut values = BTreeMap::new();
        for (key, value) in table {
            match value {
                Value::Table(section) => {
                    for (inner, value) in section {
                        if value.is_table() {
                            return Err(PopulateError::Config(with_source(
                                ErrorInfo::new(
                                    "config-nested-table",
                                    "sections may not contain nested tables",
                                )
                                .with_context("section", key.clone())
                                .with_context("key", inner),
                            )));
                        }
                        insert_unique(&mut values, inner, value).map_err(|info| {
                            let info = info.with_context("section", key.clone());
                            PopulateError::Config(with_source(info))
                        })?;
                    }
                }
                value => {
                    insert_unique(&mut values, key, value)
                        .map_err(|info| PopulateError::Config(with_source(info)))?;
                }
            }
        }
        Ok(Self {
            source: None,
            values,
        })
    }

    /// File this configuration was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns `true` when `key` is defined.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the value for `key` rendered as a string.
    pub fn getstr(&self, key: &str) -> Result<String, PopulateError> {
        let value = self.require(key)?;
        render_scalar(value).ok_or_else(|| self.type_error(key, "string"))
    }

    /// Like [`ConfigParser::getstr`], but an absent key yields `None`.
    pub fn get_opt_str(&self, key: &str) -> Result<Option<String>, PopulateError> {
        match self.values.get(key) {
            Some(value) => render_scalar(value)
                .map(Some)
                .ok_or_else(|| self.type_error(key, "string")),
            None => Ok(None),
        }
    }

    /// Returns the value for `key` coerced to a boolean.
    pub fn getbool(&self, key: &str) -> Result<bool, PopulateError> {
        let value = self.require(key)?;
        let word = match value {
            Value::Boolean(flag) => return Ok(*flag),
            Value::Integer(raw) => raw.to_string(),
            Value::String(text) => text.trim().to_ascii_lowercase(),
            _ => return Err(self.type_error(key, "bool")),
        };
        if TRUE_WORDS.contains(&word.as_str()) {
            Ok(true)
        } else if FALSE_WORDS.contains(&word.as_str()) {
            Ok(false)
        } else {
            Err(PopulateError::Config(
                self.info("config-type", "value is not a boolean", key)
                    .with_context("value", word)
                    .with_hint("expected one of 1/yes/true/on or 0/no/false/off"),
            ))
        }
    }

    /// Returns the value for `key` as a list of strings.
    ///
    /// Arrays map element-wise; strings are split on commas with blank
    /// items dropped; any other scalar becomes a single-item list.
    pub fn get_str_list(&self, key: &str) -> Result<Vec<String>, PopulateError> {
        match self.require(key)? {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    render_scalar(item).ok_or_else(|| self.type_error(key, "list of strings"))
                })
                .collect(),
            Value::String(text) => Ok(text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()),
            other => render_scalar(other)
                .map(|item| vec![item])
                .ok_or_else(|| self.type_error(key, "list of strings")),
        }
    }

    /// Sets `key` to a string value, replacing any previous definition.
    pub fn overwrite(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), Value::String(value.into()));
    }

    /// Returns a copy with every pair in `overrides` applied.
    pub fn with_overrides<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut derived = self.clone();
        for (key, value) in overrides {
            derived.overwrite(key, value);
        }
        derived
    }

    /// All values rendered as strings, skipping non-scalar entries.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter_map(|(key, value)| render_scalar(value).map(|text| (key.clone(), text)))
            .collect()
    }

    fn require(&self, key: &str) -> Result<&Value, PopulateError> {
        self.values.get(key).ok_or_else(|| {
            PopulateError::Config(self.info("config-missing-key", "required key is missing", key))
        })
    }

    fn type_error(&self, key: &str, expected: &str) -> PopulateError {
        PopulateError::Config(
            self.info("config-type", "value has the wrong type", key)
                .with_context("expected", expected),
        )
    }

    fn info(&self, code: &str, message: &str, key: &str) -> ErrorInfo {
        let info = ErrorInfo::new(code, message).with_context("key", key);
        match &self.source {
            Some(path) => info.with_context("path", path.display().to_string()),
            None => info,
        }
    }
}

/// Renders a float in shortest round-trip form, always keeping a decimal
/// point for integral values (`1.0`, `0.1`).
///
/// Values below `1e-4` or from `1e16` up use scientific notation with a
/// signed exponent of at least two digits (`1e-05`, `1.5e+16`).
pub fn render_float(value: f64) -> String {
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Integer(raw) => Some(raw.to_string()),
        Value::Float(raw) => Some(render_float(*raw)),
        Value::Boolean(flag) => Some(flag.to_string()),
        Value::Datetime(stamp) => Some(stamp.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

fn insert_unique(
    values: &mut BTreeMap<String, Value>,
    key: String,
    value: Value,
) -> Result<(), ErrorInfo> {
    if values.contains_key(&key) {
        return Err(
            ErrorInfo::new("config-duplicate-key", "key is defined more than once")
                .with_context("key", key),
        );
    }
    values.insert(key, value);
    Ok(())
}
