//! Parser configuration.
//!
//! [`ParserConfig`] is an immutable bundle of the heading patterns and limits
//! the tokenizer and matcher read. Callers build it from defaults or from
//! loosely typed key/value pairs via [`ParserConfig::from_entries`].

use log::warn;

use crate::error::ConfigError;
use crate::parsing::patterns::HeadingPattern;

pub const DEFAULT_HEADING_MAX_WORDS: usize = 10;

pub const HEADING_HASH_PATTERN: &str = r"^(?P<marker>#{1,6})\s*(?P<label>.*)";
pub const HEADING_ASTERISK_PATTERN: &str =
    r"^(?P<marker>\*{1,3})\s*(?P<label>.*?)\s*(?P<close>\*{1,3})$";
pub const INLINE_COLON_PATTERN: &str = r"^(?P<marker>\*{1,3})\s*(?P<label>.*?)\s*(?P<close>:\s*\*{1,3}|\*{1,3}\s*:)\s*(?P<content>.+)$";

pub const MATCH_HASH_PATTERN: &str = r"(?P<marker>#{1,6})\s*(?P<label>\S+)";
pub const MATCH_ASTERISK_PATTERN: &str =
    r"(?P<marker>\*{1,3})\s*(?P<label>[^*]+?)\s*(?P<close>\*{1,3})";
pub const MATCH_INLINE_COLON_PATTERN: &str =
    r"(?P<marker>\*{0,3})\s*(?P<label>[^*:]+?)\s*(?P<close>:\s*\*{0,3}|\*{1,3}\s*:)";

const KNOWN_KEYS: [&str; 7] = [
    "heading_asterisk_pattern",
    "heading_hash_pattern",
    "heading_max_words",
    "inline_colon_pattern",
    "match_asterisk_pattern",
    "match_hash_pattern",
    "match_inline_colon_pattern",
];

/// A loosely typed configuration value handed over by a config loader.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Integer(i64),
    String(String),
    Other(String),
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

#[derive(Debug, Clone)]
pub struct ParserConfig {
    heading_hash_pattern: HeadingPattern,
    heading_asterisk_pattern: HeadingPattern,
    inline_colon_pattern: HeadingPattern,
    match_hash_pattern: HeadingPattern,
    match_asterisk_pattern: HeadingPattern,
    match_inline_colon_pattern: HeadingPattern,
    heading_max_words: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            heading_hash_pattern: HeadingPattern::builtin("heading_hash_pattern", HEADING_HASH_PATTERN),
            heading_asterisk_pattern: HeadingPattern::builtin(
                "heading_asterisk_pattern",
                HEADING_ASTERISK_PATTERN,
            ),
            inline_colon_pattern: HeadingPattern::builtin("inline_colon_pattern", INLINE_COLON_PATTERN),
            match_hash_pattern: HeadingPattern::builtin("match_hash_pattern", MATCH_HASH_PATTERN),
            match_asterisk_pattern: HeadingPattern::builtin(
                "match_asterisk_pattern",
                MATCH_ASTERISK_PATTERN,
            ),
            match_inline_colon_pattern: HeadingPattern::builtin(
                "match_inline_colon_pattern",
                MATCH_INLINE_COLON_PATTERN,
            ),
            heading_max_words: DEFAULT_HEADING_MAX_WORDS,
        }
    }
}

impl ParserConfig {
    /// Builds a config from defaults overridden by `entries`.
    ///
    /// Unknown keys and values of the wrong type are skipped; each skip is
    /// logged and returned as a warning. A pattern that does not compile, or
    /// lacks the `marker`/`label` groups, is an error.
    pub fn from_entries<I, K>(entries: I) -> Result<(Self, Vec<String>), ConfigError>
    where
        I: IntoIterator<Item = (K, ConfigValue)>,
        K: AsRef<str>,
    {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        for (key, value) in entries {
            let key = key.as_ref();
            match (key, value) {
                ("heading_max_words", ConfigValue::Integer(n)) if n >= 0 => {
                    config.heading_max_words = n as usize;
                }
                (key, ConfigValue::String(source)) if is_pattern_key(key) => {
                    let pattern = HeadingPattern::new(key, &source)?;
                    *config.pattern_slot(key) = pattern;
                }
                (key, value) if KNOWN_KEYS.contains(&key) => {
                    let msg = format!(
                        "Configuration parameter '{key}' has an unsupported value ({value:?}) and will be ignored"
                    );
                    warn!("{msg}");
                    warnings.push(msg);
                }
                (key, _) => {
                    let msg = format!(
                        "Unknown configuration parameter will be ignored: '{key}'. Valid parameters are: {}",
                        KNOWN_KEYS.join(", ")
                    );
                    warn!("{msg}");
                    warnings.push(msg);
                }
            }
        }

        Ok((config, warnings))
    }

    #[must_use]
    pub fn with_heading_max_words(mut self, heading_max_words: usize) -> Self {
        self.heading_max_words = heading_max_words;
        self
    }

    pub fn heading_max_words(&self) -> usize {
        self.heading_max_words
    }

    pub fn heading_hash_pattern(&self) -> &HeadingPattern {
        &self.heading_hash_pattern
    }

    pub fn heading_asterisk_pattern(&self) -> &HeadingPattern {
        &self.heading_asterisk_pattern
    }

    pub fn inline_colon_pattern(&self) -> &HeadingPattern {
        &self.inline_colon_pattern
    }

    pub fn match_hash_pattern(&self) -> &HeadingPattern {
        &self.match_hash_pattern
    }

    pub fn match_asterisk_pattern(&self) -> &HeadingPattern {
        &self.match_asterisk_pattern
    }

    pub fn match_inline_colon_pattern(&self) -> &HeadingPattern {
        &self.match_inline_colon_pattern
    }

    fn pattern_slot(&mut self, key: &str) -> &mut HeadingPattern {
        match key {
            "heading_hash_pattern" => &mut self.heading_hash_pattern,
            "heading_asterisk_pattern" => &mut self.heading_asterisk_pattern,
            "inline_colon_pattern" => &mut self.inline_colon_pattern,
            "match_hash_pattern" => &mut self.match_hash_pattern,
            "match_asterisk_pattern" => &mut self.match_asterisk_pattern,
            _ => &mut self.match_inline_colon_pattern,
        }
    }
}

fn is_pattern_key(key: &str) -> bool {
    key.ends_with("_pattern") && KNOWN_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.heading_max_words(), 10);
        assert_eq!(config.heading_hash_pattern().as_str(), HEADING_HASH_PATTERN);
    }

    #[test]
    fn overrides_known_keys() {
        let (config, warnings) = ParserConfig::from_entries([
            ("heading_max_words", ConfigValue::Integer(7)),
            ("heading_hash_pattern", ConfigValue::from(r"^(?P<marker>#{1,3})\s+(?P<label>.+)")),
        ])
        .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.heading_max_words(), 7);
        assert!(config.heading_hash_pattern().is_match("### Three"));
        assert!(!config.heading_hash_pattern().is_match("#nospace"));
    }

    #[test]
    fn unknown_keys_are_ignored_with_warning() {
        let (config, warnings) = ParserConfig::from_entries([
            ("heading_max_words", ConfigValue::Integer(7)),
            ("random_param", ConfigValue::Integer(42)),
        ])
        .unwrap();
        assert_eq!(config.heading_max_words(), 7);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'random_param'"));
        assert!(warnings[0].contains("heading_max_words"));
    }

    #[test]
    fn wrong_value_type_is_ignored_with_warning() {
        let (config, warnings) =
            ParserConfig::from_entries([("heading_max_words", ConfigValue::from("ten"))]).unwrap();
        assert_eq!(config.heading_max_words(), DEFAULT_HEADING_MAX_WORDS);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let result = ParserConfig::from_entries([("match_hash_pattern", ConfigValue::from("(#"))]);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
