//! The unit of data carried over a [`crate::topics::Topic`].
//!
//! A `Message` is immutable once constructed and eagerly computes both the text and
//! numeric views so that subscribers never pay parse cost more than once, regardless of
//! how many agents read the same published value.

use chrono::{DateTime, Utc};

/// A single published value, with pre-computed text and numeric views.
///
/// Numeric agents (§4.5) read [`Message::as_number`]; anything that only cares about the
/// raw payload reads [`Message::as_text`] or [`Message::as_bytes`]. A message whose text
/// does not parse as an `f64` has a `NaN` numeric view, which arithmetic agents treat as
/// "ignore this input" rather than an error (spec §4.5 edge cases).
#[derive(Debug, Clone)]
pub struct Message {
    bytes: Vec<u8>,
    text: String,
    number: f64,
    published_at: DateTime<Utc>,
}

impl Message {
    /// Build a message from UTF-8-lossy bytes, parsing a numeric view opportunistically.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let number = text.trim().parse::<f64>().unwrap_or(f64::NAN);
        Self {
            bytes,
            text,
            number,
            published_at: Utc::now(),
        }
    }

    /// Build a message from a text payload.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let number = text.trim().parse::<f64>().unwrap_or(f64::NAN);
        Self {
            bytes: text.as_bytes().to_vec(),
            text,
            number,
            published_at: Utc::now(),
        }
    }

    /// Build a message directly from a numeric value (e.g. an arithmetic agent's output).
    pub fn from_number(number: f64) -> Self {
        let text = format_number(number);
        Self {
            bytes: text.as_bytes().to_vec(),
            text,
            number,
            published_at: Utc::now(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_text(&self) -> &str {
        &self.text
    }

    /// `NaN` if this message's text did not parse as a float.
    pub fn as_number(&self) -> f64 {
        self.number
    }

    pub fn is_numeric(&self) -> bool {
        !self.number.is_nan()
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

/// Render a float the way arithmetic agents publish their results: integral values
/// print without a trailing `.0` so `2 + 2` publishes `"4"`, not `"4.0"`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_parses_numeric_view() {
        let msg = Message::from_text("42.5");
        assert_eq!(msg.as_text(), "42.5");
        assert_eq!(msg.as_number(), 42.5);
        assert!(msg.is_numeric());
    }

    #[test]
    fn non_numeric_text_has_nan_view() {
        let msg = Message::from_text("hello");
        assert!(msg.as_number().is_nan());
        assert!(!msg.is_numeric());
    }

    #[test]
    fn from_number_formats_integers_without_trailing_zero() {
        let msg = Message::from_number(4.0);
        assert_eq!(msg.as_text(), "4");
        let msg = Message::from_number(4.5);
        assert_eq!(msg.as_text(), "4.5");
    }

    #[test]
    fn equality_is_by_raw_bytes() {
        assert_eq!(Message::from_text("1"), Message::from_text("1"));
        assert_ne!(Message::from_text("1"), Message::from_text("2"));
    }
}
