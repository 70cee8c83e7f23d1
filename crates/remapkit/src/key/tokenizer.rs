//! # Streaming tokenizer
//!
//! ## Overview
//!
//! The [Tokenizer] turns text containing key notation into [KeyToken] values as it arrives,
//! without needing the whole string up front. A `<` starts a pending name, which is resolved as
//! soon as it either completes a known key or can no longer become one. Pending names are
//! bounded in length, and also end at a line break, so a stray `<` never holds back input for
//! long.
//!
//! Feeding text to a tokenizer in any number of pieces produces the same keys as feeding it all
//! at once.
use super::parse::{parse_key_str, KEY_NAMES};
use super::KeyToken;

/// The longest pending name that will be held before giving up on it.
const MAX_PENDING: usize = 32;

const MODIFIERS: &str = "AaMmCcSsDd";

/// Whether `pending` could still be extended into valid bracketed notation.
fn is_viable(pending: &str) -> bool {
    let Some(mut rest) = pending.strip_prefix('<') else {
        return false;
    };
    let mut modified = false;

    loop {
        let mut chars = rest.chars();

        match (chars.next(), chars.next()) {
            (Some(m), Some('-')) if MODIFIERS.contains(m) => {
                rest = &rest[2..];
                modified = true;
            },
            _ => break,
        }
    }

    if rest.is_empty() {
        return true;
    }

    if modified && rest.chars().count() == 1 {
        return true;
    }

    if let Some(digits) = rest.strip_prefix(&['F', 'f'][..]) {
        if digits.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }

    KEY_NAMES
        .iter()
        .any(|name| name.len() >= rest.len() && name[..rest.len()].eq_ignore_ascii_case(rest))
}

/// Converts a stream of characters into keys.
#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
    pending: String,
}

impl Tokenizer {
    /// Create a new tokenizer.
    pub fn new() -> Self {
        Tokenizer::default()
    }

    /// Whether a bracketed name is waiting for more characters.
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The characters of the bracketed name that is waiting for more characters.
    pub fn pending(&self) -> &str {
        self.pending.as_str()
    }

    /// Process a single character, and return any keys it completes.
    pub fn push(&mut self, c: char) -> Vec<KeyToken> {
        let mut out = vec![];
        self.push_into(c, &mut out);
        out
    }

    /// Process several characters, and return any keys they complete.
    pub fn feed(&mut self, input: &str) -> Vec<KeyToken> {
        let mut out = vec![];

        for c in input.chars() {
            self.push_into(c, &mut out);
        }

        out
    }

    /// Give up on any pending name, and return its characters as literal keys.
    pub fn finish(&mut self) -> Vec<KeyToken> {
        let mut out = vec![];
        self.release(&mut out);
        out
    }

    fn push_into(&mut self, c: char, out: &mut Vec<KeyToken>) {
        if self.pending.is_empty() {
            if c == '<' {
                self.pending.push(c);
            } else {
                out.push(KeyToken::from(c));
            }

            return;
        }

        if c == '\n' || c == '\r' {
            self.release(out);
            out.push(KeyToken::from(c));

            return;
        }

        self.pending.push(c);

        if c == '>' {
            if let Ok((_, key)) = parse_key_str(self.pending.as_str()) {
                self.pending.clear();
                out.push(key);

                return;
            }
        }

        if self.pending.len() > MAX_PENDING || !is_viable(self.pending.as_str()) {
            self.reject(out);
        }
    }

    /// Treat the opening `<` as a literal key, and examine what followed it again.
    fn reject(&mut self, out: &mut Vec<KeyToken>) {
        let pending = std::mem::take(&mut self.pending);

        out.push(KeyToken::from('<'));

        for c in pending.chars().skip(1) {
            self.push_into(c, out);
        }
    }

    fn release(&mut self, out: &mut Vec<KeyToken>) {
        let pending = std::mem::take(&mut self.pending);

        out.extend(pending.chars().map(KeyToken::from));
    }
}
