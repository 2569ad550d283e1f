// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form model: fields, validation, data-map build

use serde_json::{Map, Value};

use crate::ajax::{FilePart, MultipartPayload, Payload};
use crate::error::{Error, Result};

/// Current value of a form field
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Text-like input
    Text(String),
    /// Checkbox state
    Checked(bool),
    /// Selected option values (multi-select, pill groups, radios)
    Selection(Vec<String>),
    /// Raw JSON from a widget's hidden input
    Json(String),
    /// Attached file, `None` when nothing was picked
    File(Option<FilePart>),
}

/// One named form field
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name, the key in the built data map
    pub name: String,
    /// Current value
    pub value: FieldValue,
    /// Whether the field must hold a value
    pub required: bool,
}

impl FormField {
    /// Text field
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
            required: false,
        }
    }

    /// Checkbox field
    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Checked(checked),
            required: false,
        }
    }

    /// Multi-select field
    pub fn selection(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Selection(values),
            required: false,
        }
    }

    /// Hidden JSON field, as written by pill/dropdown widgets
    pub fn json(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Json(raw.into()),
            required: false,
        }
    }

    /// File field
    pub fn file(name: impl Into<String>, part: Option<FilePart>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::File(part),
            required: false,
        }
    }

    /// Mark the field required
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Whether a required check on this field fails
    fn is_missing(&self) -> bool {
        match &self.value {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Checked(checked) => !checked,
            FieldValue::Selection(values) => values.is_empty(),
            FieldValue::Json(raw) => raw.trim().is_empty(),
            FieldValue::File(part) => part.is_none(),
        }
    }
}

/// A form ready for submission
#[derive(Debug, Clone, Default)]
pub struct FormModel {
    /// Form ID, used as the hook scope suffix
    pub id: String,
    /// Name of the registered submit callback, if any
    pub on_submit_callback: Option<String>,
    /// Fields in document order
    pub fields: Vec<FormField>,
}

impl FormModel {
    /// Create an empty form
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_submit_callback: None,
            fields: Vec::new(),
        }
    }

    /// Name the submit callback to invoke from the registry
    pub fn callback(mut self, name: impl Into<String>) -> Self {
        self.on_submit_callback = Some(name.into());
        self
    }

    /// Add a field
    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Check every required field
    ///
    /// Fails with the names of all offending fields in document order,
    /// so a caller can mark each one rather than fixing them one at a
    /// time.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.required && f.is_missing())
            .map(|f| f.name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { fields: missing })
        }
    }

    /// Build the structured data map and collect file parts
    ///
    /// Hidden JSON fields parse into structured values; a parse failure
    /// is reported as a validation error naming the field.
    pub fn build_data(&self) -> Result<(Map<String, Value>, Vec<FilePart>)> {
        let mut data = Map::new();
        let mut files = Vec::new();

        for field in &self.fields {
            match &field.value {
                FieldValue::Text(text) => {
                    data.insert(field.name.clone(), Value::String(text.clone()));
                }
                FieldValue::Checked(checked) => {
                    data.insert(field.name.clone(), Value::Bool(*checked));
                }
                FieldValue::Selection(values) => {
                    data.insert(
                        field.name.clone(),
                        Value::Array(values.iter().cloned().map(Value::String).collect()),
                    );
                }
                FieldValue::Json(raw) => {
                    let value: Value = serde_json::from_str(raw).map_err(|_| Error::Validation {
                        fields: vec![field.name.clone()],
                    })?;
                    data.insert(field.name.clone(), value);
                }
                FieldValue::File(part) => {
                    if let Some(part) = part {
                        data.insert(field.name.clone(), Value::String(part.filename.clone()));
                        files.push(part.clone());
                    }
                }
            }
        }

        Ok((data, files))
    }

    /// Build the payload for the request layer
    ///
    /// Forms with files become multipart; everything else is a map.
    pub fn into_payload(self) -> Result<Payload> {
        let (data, files) = self.build_data()?;

        if files.is_empty() {
            return Ok(Payload::Map(data));
        }

        let mut multipart = MultipartPayload::new();
        for (name, value) in data {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            multipart.fields.push((name, text));
        }
        for file in files {
            multipart.files.push(file);
        }
        Ok(Payload::Multipart(multipart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_collects_all_missing() {
        let form = FormModel::new("signup")
            .field(FormField::text("name", "").required(true))
            .field(FormField::text("email", "a@b.fi").required(true))
            .field(FormField::checkbox("terms", false).required(true))
            .field(FormField::selection("topics", vec![]).required(true));

        let err = form.validate().unwrap_err();
        match err {
            Error::Validation { fields } => {
                assert_eq!(fields, vec!["name", "terms", "topics"]);
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_optional_fields_never_block() {
        let form = FormModel::new("f")
            .field(FormField::text("note", ""))
            .field(FormField::file("attachment", None));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_build_data_shapes() {
        let form = FormModel::new("profile")
            .field(FormField::text("name", "Rapu"))
            .field(FormField::checkbox("newsletter", true))
            .field(FormField::selection(
                "langs",
                vec!["fi".to_string(), "sv".to_string()],
            ))
            .field(FormField::json("tags", r#"["web", "toolkit"]"#));

        let (data, files) = form.build_data().unwrap();
        assert!(files.is_empty());
        assert_eq!(data.get("name"), Some(&json!("Rapu")));
        assert_eq!(data.get("newsletter"), Some(&json!(true)));
        assert_eq!(data.get("langs"), Some(&json!(["fi", "sv"])));
        assert_eq!(data.get("tags"), Some(&json!(["web", "toolkit"])));
    }

    #[test]
    fn test_bad_hidden_json_names_field() {
        let form = FormModel::new("f").field(FormField::json("widget", "{broken"));
        match form.build_data().unwrap_err() {
            Error::Validation { fields } => assert_eq!(fields, vec!["widget"]),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_into_payload_with_file_is_multipart() {
        let part = FilePart::new("cv", "cv.pdf", "application/pdf", vec![1, 2, 3]);
        let form = FormModel::new("apply")
            .field(FormField::text("name", "Rapu"))
            .field(FormField::file("cv", Some(part)));

        match form.into_payload().unwrap() {
            Payload::Multipart(m) => {
                assert_eq!(m.files.len(), 1);
                assert!(m.fields.iter().any(|(k, v)| k == "name" && v == "Rapu"));
                assert!(m.secure);
            }
            other => panic!("Expected multipart, got {:?}", other),
        }
    }

    #[test]
    fn test_into_payload_without_file_is_map() {
        let form = FormModel::new("f").field(FormField::text("a", "1"));
        assert!(matches!(form.into_payload().unwrap(), Payload::Map(_)));
    }
}
