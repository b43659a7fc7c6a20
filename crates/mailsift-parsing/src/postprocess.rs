use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Drop text concatenated onto the top-level domain by PDF extraction.
///
/// Domain suffixes are assumed lower-case, so the first upper-case letter in
/// the last dot-separated segment starts the garbage:
/// `user@example.comAbstract` → `user@example.com`.
pub fn strip_tail(candidate: &str) -> String {
    let Some((head, last)) = candidate.rsplit_once('.') else {
        return truncate_at_uppercase(candidate).to_string();
    };
    format!("{head}.{}", truncate_at_uppercase(last))
}

fn truncate_at_uppercase(segment: &str) -> &str {
    match segment.char_indices().find(|(_, c)| c.is_uppercase()) {
        Some((index, _)) => &segment[..index],
        None => segment,
    }
}

/// Whether `candidate` is a syntactically complete `local@domain.tld` address
/// whose local part does not start with a digit.
pub fn is_well_formed(candidate: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Za-z._%+-][A-Za-z0-9._%+-]*@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
    });
    RE.is_match(candidate)
}

/// Strip tails, drop malformed leftovers and deduplicate.
///
/// Idempotent: feeding the output back in yields the same set.
pub fn post_process<I, S>(candidates: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut emails = BTreeSet::new();
    for candidate in candidates {
        let stripped = strip_tail(candidate.as_ref());
        if is_well_formed(&stripped) {
            emails.insert(stripped);
        } else {
            tracing::debug!(candidate = candidate.as_ref(), "dropping malformed candidate");
        }
    }
    emails
}
