//! Typed read access to loosely-shaped legacy documents.
//!
//! Every optional content field resolves through the same chain: the
//! top-level field, then the same-named field under `details`, then an empty
//! default. Absence never fails; a present value of the wrong shape does.

use bson::{Bson, Document};
use thiserror::Error;

/// Projection failure for a single legacy record
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("field '{field}' should be {expected}")]
    WrongShape { field: String, expected: &'static str },

    #[error("record cannot be projected: {0}")]
    NotProjectable(String),

    #[error("failed to encode projected record: {0}")]
    Encode(String),
}

impl TransformError {
    fn wrong_shape(field: &str, expected: &'static str) -> Self {
        TransformError::WrongShape {
            field: field.to_string(),
            expected,
        }
    }
}

/// Borrowed view over one legacy document
#[derive(Debug, Clone, Copy)]
pub struct LegacyRecord<'a> {
    document: &'a Document,
}

impl<'a> LegacyRecord<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Non-empty text discriminator at the top level only
    pub fn discriminator(&self, field: &str) -> Option<&'a str> {
        match self.document.get(field) {
            Some(Bson::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// `code` as text. Integer codes are rendered in decimal.
    pub fn code(&self) -> Option<String> {
        scalar_code(self.document.get("code")?)
    }

    /// The raw `details` mapping
    pub fn details(&self) -> Result<Option<&'a Document>, TransformError> {
        match self.document.get("details") {
            None | Some(Bson::Null) => Ok(None),
            Some(Bson::Document(details)) => Ok(Some(details)),
            Some(_) => Err(TransformError::wrong_shape("details", "a mapping")),
        }
    }

    /// Creation timestamp carried over from the source, if any
    pub fn created_at(&self) -> Option<&'a Bson> {
        match self.document.get("createdAt") {
            None | Some(Bson::Null) => None,
            Some(value) => Some(value),
        }
    }

    /// Text field: explicit → details → `""`
    pub fn text(&self, field: &str) -> Result<String, TransformError> {
        if let Some(text) = as_text(field, self.document.get(field))? {
            return Ok(text);
        }
        if let Some(details) = self.details()? {
            if let Some(text) = as_text(field, details.get(field))? {
                return Ok(text);
            }
        }
        Ok(String::new())
    }

    /// List field: explicit → details → `[]`
    pub fn list(&self, field: &str) -> Result<Vec<Bson>, TransformError> {
        if let Some(list) = as_list(field, self.document.get(field))? {
            return Ok(list);
        }
        if let Some(details) = self.details()? {
            if let Some(list) = as_list(field, details.get(field))? {
                return Ok(list);
            }
        }
        Ok(Vec::new())
    }

    /// Mapping field: explicit → details → `{}`
    pub fn mapping(&self, field: &str) -> Result<Document, TransformError> {
        if let Some(mapping) = as_mapping(field, self.document.get(field))? {
            return Ok(mapping);
        }
        if let Some(details) = self.details()? {
            if let Some(mapping) = as_mapping(field, details.get(field))? {
                return Ok(mapping);
            }
        }
        Ok(Document::new())
    }
}

/// Text or integer scalar rendered as a non-empty string.
/// Whole-number doubles (mongo shell / JS numbers) count as integers.
pub(crate) fn scalar_code(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{:.0}", n)),
        _ => None,
    }
}

// Empty strings fall through to the next source; numbers are rendered.
fn as_text(field: &str, value: Option<&Bson>) -> Result<Option<String>, TransformError> {
    match value {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::String(s)) if s.is_empty() => Ok(None),
        Some(Bson::String(s)) => Ok(Some(s.clone())),
        Some(Bson::Int32(n)) => Ok(Some(n.to_string())),
        Some(Bson::Int64(n)) => Ok(Some(n.to_string())),
        Some(Bson::Double(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(TransformError::wrong_shape(field, "text")),
    }
}

fn as_list(field: &str, value: Option<&Bson>) -> Result<Option<Vec<Bson>>, TransformError> {
    match value {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Array(items)) => Ok(Some(items.clone())),
        Some(_) => Err(TransformError::wrong_shape(field, "a list")),
    }
}

fn as_mapping(field: &str, value: Option<&Bson>) -> Result<Option<Document>, TransformError> {
    match value {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Document(mapping)) => Ok(Some(mapping.clone())),
        Some(_) => Err(TransformError::wrong_shape(field, "a mapping")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{bson, doc};

    #[test]
    fn text_prefers_top_level_then_details() {
        let document = doc! {
            "overview": "top",
            "advice": "",
            "details": { "overview": "nested", "advice": "from details", "career": "builder" },
        };
        let record = LegacyRecord::new(&document);

        assert_eq!(record.text("overview").unwrap(), "top");
        assert_eq!(record.text("advice").unwrap(), "from details");
        assert_eq!(record.text("career").unwrap(), "builder");
        assert_eq!(record.text("vibration").unwrap(), "");
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let document = doc! { "code": "7" };
        let record = LegacyRecord::new(&document);

        assert_eq!(record.list("traits").unwrap(), Vec::<Bson>::new());
        assert_eq!(record.mapping("lucky_elements").unwrap(), Document::new());
    }

    #[test]
    fn empty_list_at_top_level_does_not_fall_through() {
        let document = doc! { "traits": [], "details": { "traits": ["curious"] } };
        let record = LegacyRecord::new(&document);
        assert!(record.list("traits").unwrap().is_empty());
    }

    #[test]
    fn null_falls_through_to_details() {
        let document = doc! { "traits": Bson::Null, "details": { "traits": ["curious"] } };
        let record = LegacyRecord::new(&document);
        assert_eq!(record.list("traits").unwrap(), vec![bson!("curious")]);
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let document = doc! { "traits": "curious, calm" };
        let record = LegacyRecord::new(&document);
        assert_eq!(
            record.list("traits").unwrap_err(),
            TransformError::WrongShape { field: "traits".into(), expected: "a list" }
        );
    }

    #[test]
    fn details_must_be_a_mapping() {
        let document = doc! { "details": ["not", "a", "mapping"] };
        let record = LegacyRecord::new(&document);
        assert!(record.text("career").is_err());
    }

    #[test]
    fn integer_codes_render_as_text() {
        let document = doc! { "code": 11_i32 };
        assert_eq!(LegacyRecord::new(&document).code().as_deref(), Some("11"));

        let blank = doc! { "code": "  " };
        assert_eq!(LegacyRecord::new(&blank).code(), None);
    }

    #[test]
    fn whole_number_double_codes_render_without_fraction() {
        let document = doc! { "code": 7.0_f64 };
        assert_eq!(LegacyRecord::new(&document).code().as_deref(), Some("7"));

        let fractional = doc! { "code": 7.25_f64 };
        assert_eq!(LegacyRecord::new(&fractional).code(), None);
    }

    #[test]
    fn numeric_text_fields_are_rendered() {
        let document = doc! { "vibration": 7_i64 };
        assert_eq!(LegacyRecord::new(&document).text("vibration").unwrap(), "7");
    }
}
