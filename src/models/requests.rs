use bytes::Bytes;
use std::collections::HashMap;

/// A single multipart field received from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl FormField {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            bytes: Bytes::from(value.into()),
            content_type: None,
        }
    }

    pub fn file(bytes: impl Into<Bytes>, content_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: Some(content_type.to_string()),
        }
    }
}

/// Field set of an inbound try-on request
///
/// Expected keys are `person` or `person_url`, and `garment` or `garment_url`.
/// A repeated key keeps its first occurrence.
#[derive(Debug, Clone, Default)]
pub struct InboundFields {
    fields: HashMap<String, FormField>,
}

impl InboundFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, field: FormField) {
        self.fields.entry(name.into()).or_insert(field);
    }

    pub fn with(mut self, name: &str, field: FormField) -> Self {
        self.insert(name, field);
        self
    }

    /// A binary field, if present and non-empty
    pub fn binary(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name).filter(|f| !f.bytes.is_empty())
    }

    /// A text field, trimmed, if present and non-blank
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|f| String::from_utf8_lossy(&f.bytes).trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_count_as_absent() {
        let fields = InboundFields::new()
            .with("person", FormField::file(Vec::<u8>::new(), "image/jpeg"))
            .with("person_url", FormField::text("   "));

        assert!(fields.binary("person").is_none());
        assert!(fields.text("person_url").is_none());
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_field_constructors() {
        let file = FormField::file(vec![1u8, 2], "image/png");
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
        assert_eq!(&file.bytes[..], &[1, 2]);

        let text = FormField::text("https://a.test/p.jpg");
        assert!(text.content_type.is_none());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut fields = InboundFields::new();
        fields.insert("garment_url", FormField::text(" https://a.test/g.png "));
        fields.insert("garment_url", FormField::text("https://b.test/g.png"));

        assert_eq!(fields.text("garment_url").as_deref(), Some("https://a.test/g.png"));
    }
}
