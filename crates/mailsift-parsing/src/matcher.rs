use once_cell::sync::Lazy;
use regex::Regex;

/// Domain part shared by every strategy: labels, a dot, a 2+ letter suffix.
const DOMAIN: &str = r"[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// Extract plain addresses, discarding any footnote digits glued to the front.
///
/// `"contact 1john.doe@example.com for info"` → `["john.doe@example.com"]`
pub fn match_plain(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(&format!(
            r"\b(\d+)?([a-zA-Z][a-zA-Z0-9._%+-]*@{DOMAIN})\b"
        ))
        .unwrap()
    });
    RE.captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract the trailing address when the whole text is `<digits><email>`.
///
/// Only useful when normalization reduced the page to a single token:
/// `"42jane@example.org"` → `["jane@example.org"]`, anything around it → `[]`.
/// The local part must not start with a digit, so an all-digit local part
/// like `12345@qq.com` is not split into `1234` + `5@qq.com`.
pub fn match_digit_prefixed(text: &str) -> Vec<String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(&format!(
            r"^\d+([a-zA-Z._%+-][a-zA-Z0-9._%+-]*@{DOMAIN})$"
        ))
        .unwrap()
    });
    RE.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| vec![m.as_str().to_string()])
        .unwrap_or_default()
}

/// Compiled matcher for bracketed shared-domain groups like `{alice, bob}@example.com`.
#[derive(Debug, Clone)]
pub struct CombinedPattern {
    group_re: Regex,
    separator_re: Option<Regex>,
}

impl CombinedPattern {
    /// Build the pattern for the given `(open, close)` bracket pairs and separators.
    ///
    /// Returns `None` when no bracket pairs are configured.
    pub fn new(brackets: &[(char, char)], separators: &[char]) -> Option<Self> {
        if brackets.is_empty() {
            return None;
        }
        let alternation = |chars: Vec<char>| {
            chars
                .iter()
                .map(|c| regex::escape(&c.to_string()))
                .collect::<Vec<_>>()
                .join("|")
        };
        let open = alternation(brackets.iter().map(|(o, _)| *o).collect());
        let close = alternation(brackets.iter().map(|(_, c)| *c).collect());
        // Usernames never contain a bracket, so a group cannot start at an
        // unrelated opening bracket earlier on the line.
        let bracket_class: String = brackets
            .iter()
            .flat_map(|(o, c)| [*o, *c])
            .map(|c| regex::escape(&c.to_string()))
            .collect();

        let group_re = Regex::new(&format!(
            r"(?:{open})\s*([^@{bracket_class}]+?)\s*(?:{close})\s*@\s*({DOMAIN})"
        ))
        .ok()?;

        let separator_re = if separators.is_empty() {
            None
        } else {
            let class: String = separators
                .iter()
                .map(|c| regex::escape(&c.to_string()))
                .collect();
            Some(Regex::new(&format!(r"\s*[{class}]\s*")).ok()?)
        };

        Some(Self {
            group_re,
            separator_re,
        })
    }

    /// Expand every non-overlapping bracket group in `text` into full addresses.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        let mut emails = Vec::new();
        for caps in self.group_re.captures_iter(text) {
            let (Some(users), Some(domain)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let users = users.as_str().trim();
            let domain = domain.as_str().trim();
            let names: Vec<&str> = match &self.separator_re {
                Some(re) => re.split(users).collect(),
                None => vec![users],
            };
            for name in names {
                let name = name.trim().trim_start_matches(|c: char| c.is_ascii_digit());
                emails.push(format!("{name}@{domain}"));
            }
        }
        emails
    }
}

/// Expand bracketed username groups sharing one domain.
///
/// Usernames are trimmed and stripped of leading digits before `@domain` is
/// appended. Text without a bracket group yields no candidates.
pub fn match_combined(text: &str, brackets: &[(char, char)], separators: &[char]) -> Vec<String> {
    CombinedPattern::new(brackets, separators)
        .map(|pattern| pattern.find_all(text))
        .unwrap_or_default()
}

/// Run all three strategies and concatenate their candidates.
pub fn match_all(text: &str, combined: Option<&CombinedPattern>) -> Vec<String> {
    let mut candidates = match_plain(text);
    if let Some(pattern) = combined {
        candidates.extend(pattern.find_all(text));
    }
    candidates.extend(match_digit_prefixed(text));
    candidates
}
