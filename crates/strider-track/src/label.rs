//! Bounded-length names for tracked variables and their owners.

use std::fmt;

/// Maximum label length in bytes (a 64-byte buffer minus the terminator).
pub const LABEL_CAPACITY: usize = 63;

/// A variable or function name, truncated to [`LABEL_CAPACITY`] bytes.
///
/// Truncation never splits a UTF-8 character: the label is cut at the last
/// character boundary that fits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Label {
    text: String,
    truncated: bool,
}

impl Label {
    /// Create a label, truncating input longer than [`LABEL_CAPACITY`].
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.len() <= LABEL_CAPACITY {
            return Self {
                text: text.to_owned(),
                truncated: false,
            };
        }

        let mut end = LABEL_CAPACITY;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        tracing::debug!(
            original_len = text.len(),
            kept = end,
            "label truncated to {LABEL_CAPACITY} bytes"
        );
        Self {
            text: text[..end].to_owned(),
            truncated: true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the input was longer than the capacity.
    #[must_use]
    pub const fn was_truncated(&self) -> bool {
        self.truncated
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_label_kept() {
        let label = Label::new("matrix_a");
        assert_eq!(label.as_str(), "matrix_a");
        assert!(!label.was_truncated());
    }

    #[test]
    fn test_label_at_capacity_kept() {
        let text = "x".repeat(LABEL_CAPACITY);
        let label = Label::new(&text);
        assert_eq!(label.as_str().len(), LABEL_CAPACITY);
        assert!(!label.was_truncated());
    }

    #[test]
    fn test_long_label_truncated() {
        let text = "y".repeat(100);
        let label = Label::new(&text);
        assert_eq!(label.as_str(), &text[..LABEL_CAPACITY]);
        assert!(label.was_truncated());
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // 62 ASCII bytes followed by a 2-byte character straddling the limit
        let text = format!("{}é", "a".repeat(62));
        let label = Label::new(&text);
        assert_eq!(label.as_str(), "a".repeat(62));
        assert!(label.was_truncated());
    }
}
