use crate::config::ParsingConfig;

/// Cut `text` at the first ASCII-case-insensitive occurrence of `keyword`.
///
/// Author and affiliation blocks precede the abstract on proceedings pages,
/// so everything from the keyword on is dropped. Returns the trimmed prefix,
/// or the text unchanged when the keyword is absent.
pub fn truncate_at_keyword(text: &str, keyword: &str) -> String {
    if keyword.is_empty() {
        return text.to_string();
    }
    // ASCII lowercasing preserves byte offsets, so the index is valid in `text`.
    match text
        .to_ascii_lowercase()
        .find(&keyword.to_ascii_lowercase())
    {
        Some(index) => text[..index].trim().to_string(),
        None => text.to_string(),
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Keep only lines containing both `@` and `.`, rejoined with `\n`.
pub fn keep_email_lines(text: &str) -> String {
    text.split(is_line_break)
        .filter(|line| line.contains('@') && line.contains('.'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove every occurrence of the given characters.
pub fn strip_chars(text: &str, chars: &[char]) -> String {
    text.chars().filter(|c| !chars.contains(c)).collect()
}

/// Collapse whitespace (including newlines) on both sides of each glue character.
///
/// `"user @ example . com"` → `"user@example.com"`
pub fn collapse_whitespace_around(text: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut after_glue = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !after_glue {
                pending.push(ch);
            }
            continue;
        }
        if chars.contains(&ch) {
            after_glue = true;
        } else {
            out.push_str(&pending);
            after_glue = false;
        }
        pending.clear();
        out.push(ch);
    }
    if !after_glue {
        out.push_str(&pending);
    }
    out
}

/// The four normalization steps with their parameters resolved once.
#[derive(Debug, Clone)]
pub struct Normalizer {
    abstract_keyword: Option<String>,
    strip_chars: Vec<char>,
    glue_chars: Vec<char>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ParsingConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &ParsingConfig) -> Self {
        Self {
            abstract_keyword: config
                .truncate_at_abstract()
                .then(|| config.abstract_keyword().to_string()),
            strip_chars: config.strip_chars(),
            glue_chars: config.glue_chars(),
        }
    }

    /// Run truncation, line filtering, character stripping and refinement in order.
    pub fn normalize(&self, raw: &str) -> String {
        let text = match &self.abstract_keyword {
            Some(keyword) => truncate_at_keyword(raw, keyword),
            None => raw.to_string(),
        };
        let text = keep_email_lines(&text);
        let text = strip_chars(&text, &self.strip_chars);
        collapse_whitespace_around(&text, &self.glue_chars)
    }
}
