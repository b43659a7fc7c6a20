use mailsift_core::config_file::ParsingSection;

use crate::ParsingError;

/// Default bracket pairs recognised around shared-domain username groups.
pub const DEFAULT_BRACKETS: &[(char, char)] = &[('{', '}'), ('(', ')'), ('<', '>')];
/// Default username separators inside a bracket group.
pub const DEFAULT_SEPARATORS: &[char] = &[',', ';'];
/// Footnote markers that interleave with addresses in extracted text.
pub const DEFAULT_STRIP_CHARS: &[char] = &['*', '#'];
/// Characters whose surrounding whitespace is collapsed.
pub const DEFAULT_GLUE_CHARS: &[char] = &['@', '.', '-', '_'];
/// How many characters after the first `@` must contain a `.`.
pub const DEFAULT_IGNORE_WINDOW: usize = 15;
pub const DEFAULT_ABSTRACT_KEYWORD: &str = "abstract";

/// How a configured list relates to its built-in default list.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    #[default]
    Default,
    /// Use only these values.
    Replace(Vec<T>),
    /// Use the defaults followed by these values.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        let (base, extra): (&[T], &[T]) = match self {
            ListOverride::Default => (defaults, &[][..]),
            ListOverride::Replace(v) => (&[][..], v.as_slice()),
            ListOverride::Extend(v) => (defaults, v.as_slice()),
        };
        base.iter().chain(extra).cloned().collect()
    }
}

/// Configuration for the normalization and matching pipeline.
///
/// Use [`ParsingConfigBuilder`] to construct from string values (config files,
/// CLI flags); [`ParsingConfig::default`] gives the built-in behaviour.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── normalize.rs ──
    /// Cut the page at the first case-insensitive `abstract_keyword`.
    pub(crate) truncate_at_abstract: bool,
    pub(crate) abstract_keyword: String,
    pub(crate) strip_chars: ListOverride<char>,
    pub(crate) glue_chars: ListOverride<char>,

    // ── matcher.rs ──
    pub(crate) brackets: ListOverride<(char, char)>,
    pub(crate) separators: ListOverride<char>,

    // ── extractor.rs ──
    /// Plausibility window after the first `@` (default: 15).
    pub(crate) ignore_window: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            truncate_at_abstract: true,
            abstract_keyword: DEFAULT_ABSTRACT_KEYWORD.to_string(),
            strip_chars: ListOverride::Default,
            glue_chars: ListOverride::Default,
            brackets: ListOverride::Default,
            separators: ListOverride::Default,
            ignore_window: DEFAULT_IGNORE_WINDOW,
        }
    }
}

impl ParsingConfig {
    pub fn truncate_at_abstract(&self) -> bool {
        self.truncate_at_abstract
    }

    pub fn abstract_keyword(&self) -> &str {
        &self.abstract_keyword
    }

    pub fn strip_chars(&self) -> Vec<char> {
        self.strip_chars.resolve(DEFAULT_STRIP_CHARS)
    }

    pub fn glue_chars(&self) -> Vec<char> {
        self.glue_chars.resolve(DEFAULT_GLUE_CHARS)
    }

    pub fn brackets(&self) -> Vec<(char, char)> {
        self.brackets.resolve(DEFAULT_BRACKETS)
    }

    pub fn separators(&self) -> Vec<char> {
        self.separators.resolve(DEFAULT_SEPARATORS)
    }

    pub fn ignore_window(&self) -> usize {
        self.ignore_window
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string values and validates them in [`build()`](Self::build):
/// brackets must be exactly two characters, every other character entry exactly one.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    truncate_at_abstract: Option<bool>,
    abstract_keyword: Option<String>,
    strip_chars: ListOverride<String>,
    glue_chars: ListOverride<String>,
    brackets: ListOverride<String>,
    separators: ListOverride<String>,
    ignore_window: Option<usize>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[parsing]` section of a config file.
    /// Lists present in the file replace the defaults.
    pub fn from_section(section: &ParsingSection) -> Self {
        let replace = |v: &Option<Vec<String>>| match v {
            Some(values) => ListOverride::Replace(values.clone()),
            None => ListOverride::Default,
        };
        Self {
            truncate_at_abstract: section.truncate_at_abstract,
            abstract_keyword: section.abstract_keyword.clone(),
            strip_chars: replace(&section.strip_chars),
            glue_chars: replace(&section.glue_chars),
            brackets: replace(&section.brackets),
            separators: replace(&section.separators),
            ignore_window: section.ignore_window,
        }
    }

    // ── Abstract truncation ──

    pub fn truncate_at_abstract(mut self, enabled: bool) -> Self {
        self.truncate_at_abstract = Some(enabled);
        self
    }

    pub fn abstract_keyword(mut self, keyword: &str) -> Self {
        self.abstract_keyword = Some(keyword.to_string());
        self
    }

    // ── Character sets ──

    pub fn set_strip_chars(mut self, chars: Vec<String>) -> Self {
        self.strip_chars = ListOverride::Replace(chars);
        self
    }

    pub fn set_glue_chars(mut self, chars: Vec<String>) -> Self {
        self.glue_chars = ListOverride::Replace(chars);
        self
    }

    // ── Bracket groups ──

    pub fn set_brackets(mut self, brackets: Vec<String>) -> Self {
        self.brackets = ListOverride::Replace(brackets);
        self
    }

    pub fn add_bracket(mut self, bracket: String) -> Self {
        match &mut self.brackets {
            ListOverride::Extend(v) => v.push(bracket),
            _ => self.brackets = ListOverride::Extend(vec![bracket]),
        }
        self
    }

    pub fn set_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = ListOverride::Replace(separators);
        self
    }

    pub fn add_separator(mut self, separator: String) -> Self {
        match &mut self.separators {
            ListOverride::Extend(v) => v.push(separator),
            _ => self.separators = ListOverride::Extend(vec![separator]),
        }
        self
    }

    // ── Gate ──

    pub fn ignore_window(mut self, window: usize) -> Self {
        self.ignore_window = Some(window);
        self
    }

    /// Validate all string values and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let defaults = ParsingConfig::default();

        if let Some(ref keyword) = self.abstract_keyword {
            if keyword.trim().is_empty() {
                return Err(ParsingError::InvalidConfig(
                    "abstract keyword must not be empty".into(),
                ));
            }
        }

        Ok(ParsingConfig {
            truncate_at_abstract: self
                .truncate_at_abstract
                .unwrap_or(defaults.truncate_at_abstract),
            abstract_keyword: self.abstract_keyword.unwrap_or(defaults.abstract_keyword),
            strip_chars: map_override(self.strip_chars, |s| single_char(s, "strip char"))?,
            glue_chars: map_override(self.glue_chars, |s| single_char(s, "glue char"))?,
            brackets: map_override(self.brackets, bracket_pair)?,
            separators: map_override(self.separators, |s| single_char(s, "separator"))?,
            ignore_window: self.ignore_window.unwrap_or(defaults.ignore_window),
        })
    }
}

fn map_override<T>(
    list: ListOverride<String>,
    convert: impl Fn(&str) -> Result<T, ParsingError>,
) -> Result<ListOverride<T>, ParsingError> {
    let convert_all = |values: Vec<String>| -> Result<Vec<T>, ParsingError> {
        values.iter().map(|s| convert(s.as_str())).collect()
    };
    Ok(match list {
        ListOverride::Default => ListOverride::Default,
        ListOverride::Replace(v) => ListOverride::Replace(convert_all(v)?),
        ListOverride::Extend(v) => ListOverride::Extend(convert_all(v)?),
    })
}

fn single_char(s: &str, what: &str) -> Result<char, ParsingError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ParsingError::InvalidConfig(format!(
            "{what} must be a single character, got {s:?}"
        ))),
    }
}

fn bracket_pair(s: &str) -> Result<(char, char), ParsingError> {
    let chars: Vec<char> = s.chars().collect();
    match chars.as_slice() {
        [open, close] => Ok((*open, *close)),
        _ => Err(ParsingError::InvalidConfig(format!(
            "bracket must be an open/close pair like \"{{}}\", got {s:?}"
        ))),
    }
}
