//! Property list documents exchanged with the validation service.
//!
//! Every read goes through a typed accessor so that missing keys and values of
//! the wrong type surface as a [`DocumentError`] instead of partial data.

use std::io::Cursor;

use plist::{Dictionary, Value};

use crate::errors::DocumentError;

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// A property list whose top-level value is a dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredDocument {
    entries: Dictionary,
}

impl StructuredDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an XML or binary property list.
    pub fn parse(bytes: &[u8]) -> DocumentResult<Self> {
        let value = Value::from_reader(Cursor::new(bytes))
            .map_err(|e| DocumentError::NotParseable(e.to_string()))?;
        let entries = value
            .into_dictionary()
            .ok_or(DocumentError::NotADictionary)?;
        Ok(Self { entries })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Data value that must be present.
    pub fn required_data(&self, key: &str) -> DocumentResult<&[u8]> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| DocumentError::MissingField(key.to_string()))?;
        value.as_data().ok_or_else(|| DocumentError::WrongType {
            key: key.to_string(),
            expected: "data",
        })
    }

    /// String value that may be absent but must be a string when present.
    pub fn optional_string(&self, key: &str) -> DocumentResult<Option<&str>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_string()
                .map(Some)
                .ok_or_else(|| DocumentError::WrongType {
                    key: key.to_string(),
                    expected: "a string",
                }),
        }
    }

    /// Integer value that may be absent but must be an integer when present.
    pub fn optional_integer(&self, key: &str) -> DocumentResult<Option<i64>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_signed_integer()
                .map(Some)
                .ok_or_else(|| DocumentError::WrongType {
                    key: key.to_string(),
                    expected: "an integer",
                }),
        }
    }

    pub fn insert_data(&mut self, key: &str, data: Vec<u8>) {
        self.entries.insert(key.to_string(), Value::Data(data));
    }

    pub fn insert_string(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), Value::String(value));
    }

    pub fn insert_document(&mut self, key: &str, document: StructuredDocument) {
        self.entries
            .insert(key.to_string(), Value::Dictionary(document.entries));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the document as an XML property list.
    pub fn to_xml(&self) -> DocumentResult<Vec<u8>> {
        let mut buf = Vec::new();
        Value::Dictionary(self.entries.clone())
            .to_writer_xml(&mut buf)
            .map_err(|e| DocumentError::Serialize(e.to_string()))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>cert</key>
    <data>AQIDBA==</data>
    <key>status</key>
    <integer>0</integer>
    <key>name</key>
    <string>validation</string>
</dict>
</plist>"#;

    #[test]
    fn test_typed_accessors() {
        let doc = StructuredDocument::parse(CERT_PLIST.as_bytes()).unwrap();
        assert_eq!(doc.required_data("cert").unwrap(), &[1, 2, 3, 4]);
        assert_eq!(doc.optional_integer("status").unwrap(), Some(0));
        assert_eq!(doc.optional_string("name").unwrap(), Some("validation"));
        assert_eq!(doc.optional_string("absent").unwrap(), None);
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let doc = StructuredDocument::parse(CERT_PLIST.as_bytes()).unwrap();
        assert_eq!(
            doc.required_data("name"),
            Err(DocumentError::WrongType {
                key: "name".to_string(),
                expected: "data"
            })
        );
        assert!(matches!(
            doc.optional_integer("cert"),
            Err(DocumentError::WrongType { .. })
        ));
        assert!(matches!(
            doc.optional_string("status"),
            Err(DocumentError::WrongType { .. })
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let doc = StructuredDocument::parse(CERT_PLIST.as_bytes()).unwrap();
        assert_eq!(
            doc.required_data("session-info"),
            Err(DocumentError::MissingField("session-info".to_string()))
        );
    }

    #[test]
    fn test_rejects_non_plist_and_non_dictionary() {
        assert!(matches!(
            StructuredDocument::parse(b"<html>502 Bad Gateway</html>"),
            Err(DocumentError::NotParseable(_))
        ));
        let array = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><array><string>cert</string></array></plist>"#;
        assert_eq!(
            StructuredDocument::parse(array.as_bytes()),
            Err(DocumentError::NotADictionary)
        );
    }

    #[test]
    fn test_nested_document_serializes_to_xml() {
        let mut inner = StructuredDocument::new();
        inner.insert_string("serial-number", "GYD6Q9YDH4".to_string());
        let mut doc = StructuredDocument::new();
        doc.insert_data("session-info-request", vec![0xde, 0xad]);
        doc.insert_document("device-info", inner);

        let xml = doc.to_xml().unwrap();
        let text = String::from_utf8(xml.clone()).unwrap();
        assert!(text.contains("<key>session-info-request</key>"));
        assert!(text.contains("GYD6Q9YDH4"));

        let parsed = StructuredDocument::parse(&xml).unwrap();
        assert_eq!(parsed.required_data("session-info-request").unwrap(), &[0xde, 0xad]);
        assert!(parsed.contains("device-info"));
    }
}
