//! Field name escaping for MongoDB compatibility.
//!
//! MongoDB reserves dots and dollar signs in field names for its query syntax and uses
//! the null byte as a terminator. Item and schema keys are arbitrary JSON, and JSON
//! Schema documents themselves use keys like `$schema` and `$ref`, so every key is
//! escaped before it is written and unescaped when it is read back.
//!
//! Escaping is percent-style and only touches keys. The escape character itself is
//! escaped too, so any key survives the round-trip unchanged. Values are never altered.

use bson::{Bson, Document};

/// Escapes and restores field names in BSON values.
pub(crate) struct ValueSanitizer;

impl ValueSanitizer {
    /// `(raw, escaped)` pairs. `%` comes first so that escaping never double-escapes.
    const REPLACEMENTS: [(char, &'static str); 4] = [
        ('%', "%25"),
        ('.', "%2E"),
        ('$', "%24"),
        ('\0', "%00"),
    ];

    /// Recursively escapes every document key inside `value`.
    pub(crate) fn sanitize_value(value: Bson) -> Bson {
        match value {
            Bson::Array(arr) => Bson::Array(arr.into_iter().map(Self::sanitize_value).collect()),
            Bson::Document(doc) => Bson::Document(Self::sanitize_document(doc)),
            other => other,
        }
    }

    pub(crate) fn sanitize_document(doc: Document) -> Document {
        doc.into_iter()
            .map(|(k, v)| (Self::sanitize_key(&k), Self::sanitize_value(v)))
            .collect()
    }

    /// Escapes a single key.
    pub(crate) fn sanitize_key(input: &str) -> String {
        let mut sanitized = String::with_capacity(input.len());
        for ch in input.chars() {
            match Self::REPLACEMENTS.iter().find(|(raw, _)| *raw == ch) {
                Some((_, escaped)) => sanitized.push_str(escaped),
                None => sanitized.push(ch),
            }
        }
        sanitized
    }

    /// Recursively reverts [`sanitize_value`](Self::sanitize_value).
    pub(crate) fn restore_value(value: Bson) -> Bson {
        match value {
            Bson::Array(arr) => Bson::Array(arr.into_iter().map(Self::restore_value).collect()),
            Bson::Document(doc) => Bson::Document(Self::restore_document(doc)),
            other => other,
        }
    }

    pub(crate) fn restore_document(doc: Document) -> Document {
        doc.into_iter()
            .map(|(k, v)| (Self::restore_key(&k), Self::restore_value(v)))
            .collect()
    }

    /// Unescapes a single key. Unknown escape sequences are kept verbatim.
    pub(crate) fn restore_key(input: &str) -> String {
        let mut restored = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(pos) = rest.find('%') {
            restored.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            match Self::REPLACEMENTS
                .iter()
                .find(|(_, escaped)| tail.starts_with(escaped))
            {
                Some((raw, escaped)) => {
                    restored.push(*raw);
                    rest = &tail[escaped.len()..];
                }
                None => {
                    restored.push('%');
                    rest = &tail[1..];
                }
            }
        }

        restored.push_str(rest);
        restored
    }
}
