use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File { file_name: String, content: Vec<u8> },
}

/// Insertion-ordered request parameters.
///
/// Text keys are unique: setting an existing key replaces its value in place.
/// File parts may share a key (every attachment is sent as `attachments`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, FieldValue)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = FieldValue::Text(value.into());
        let existing = self
            .entries
            .iter_mut()
            .find(|(k, v)| *k == key && matches!(v, FieldValue::Text(_)));
        match existing {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Set `key` only when `value` is non-empty.
    pub fn set_non_empty(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.set(key, value);
        }
    }

    /// Set `key` to `"true"` only when `flag` is set.
    pub fn set_flag(&mut self, key: &str, flag: bool) {
        if flag {
            self.set(key, "true");
        }
    }

    /// Set `key` to the decimal value only when it is non-zero.
    pub fn set_non_zero(&mut self, key: &str, value: i64) {
        if value != 0 {
            self.set(key, value.to_string());
        }
    }

    pub fn push_file(
        &mut self,
        key: impl Into<String>,
        file_name: impl Into<String>,
        content: Vec<u8>,
    ) {
        self.entries.push((
            key.into(),
            FieldValue::File {
                file_name: file_name.into(),
                content,
            },
        ));
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.text_fields()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn has_files(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, v)| matches!(v, FieldValue::File { .. }))
    }

    pub fn text_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            FieldValue::Text(text) => Some((k.as_str(), text.as_str())),
            FieldValue::File { .. } => None,
        })
    }

    pub fn into_entries(self) -> Vec<(String, FieldValue)> {
        self.entries
    }

    /// URL-form encoding of the text fields, in insertion order.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.text_fields())
            .finish()
    }

    /// Choose the wire encoding: multipart when any file part is present.
    pub fn into_body(self) -> RequestBody {
        if self.has_files() {
            RequestBody::Multipart(self)
        } else {
            RequestBody::Form(self.encode())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Pre-encoded `application/x-www-form-urlencoded` body.
    Form(String),
    /// Fields and file parts for a `multipart/form-data` body.
    Multipart(ParameterSet),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}
