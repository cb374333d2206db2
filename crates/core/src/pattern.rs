//! User-supplied regular expressions in `/pattern/flags` or bare form

use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern '{pattern}': {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unsupported flag '{0}' in pattern")]
    UnknownFlag(char),
}

/// A compiled pattern plus whether replacements hit every match
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    global: bool,
}

impl Pattern {
    /// Parse `/body/flags` or a bare body.
    ///
    /// Slash-delimited patterns search anywhere in the input and accept the
    /// `g`, `i`, `m`, `s` and `y` flags. A bare body must match the whole
    /// input.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let (body, flags, anchored) = match split_delimited(source) {
            Some((body, flags)) => (body.to_string(), flags, false),
            None => (source.to_string(), "", true),
        };

        let body = if anchored {
            format!("^(?:{})$", body)
        } else {
            body
        };
        let mut builder = RegexBuilder::new(&body);
        let mut global = false;
        for flag in flags.chars() {
            match flag {
                'g' => global = true,
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                // sticky matching has no effect on whole-value tests
                'y' | 'u' => {}
                other => return Err(PatternError::UnknownFlag(other)),
            }
        }

        let regex = builder.build().map_err(|err| PatternError::Invalid {
            pattern: source.to_string(),
            source: err,
        })?;
        Ok(Self { regex, global })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace the first match (every match with `g`) using `$1`-style groups
    pub fn replace(&self, text: &str, replacement: &str) -> String {
        let replacement = normalize_groups(replacement);
        if self.global {
            self.regex.replace_all(text, replacement.as_str()).into_owned()
        } else {
            self.regex.replace(text, replacement.as_str()).into_owned()
        }
    }
}

fn split_delimited(source: &str) -> Option<(&str, &str)> {
    let rest = source.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let flags = &rest[end + 1..];
    if flags.chars().all(|c| c.is_ascii_alphabetic()) {
        Some((&rest[..end], flags))
    } else {
        None
    }
}

/// Rewrite `$1` as `${1}` so a following letter is not read as part of the
/// group name
fn normalize_groups(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut digits = String::new();
        while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(d);
            chars.next();
        }
        if digits.is_empty() {
            out.push('$');
        } else {
            out.push_str("${");
            out.push_str(&digits);
            out.push('}');
        }
    }
    out
}
