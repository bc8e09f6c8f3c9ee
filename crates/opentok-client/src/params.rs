//! Form parameters and request body rendering.

use std::collections::BTreeMap;

/// Multi-valued form fields: field name to ordered values.
///
/// A `BTreeMap` keeps field order deterministic (sorted by name); values
/// within a field keep the caller's order.
pub type SessionParams = BTreeMap<String, Vec<String>>;

/// A single form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    name: String,
    value: String,
}

impl Param {
    /// Create a new parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Flatten a field map into one [`Param`] per value.
///
/// `None` and an empty map both yield an empty sequence.
pub fn to_param_sequence(fields: Option<&SessionParams>) -> Vec<Param> {
    let Some(fields) = fields else {
        return Vec::new();
    };

    fields
        .iter()
        .flat_map(|(name, values)| values.iter().map(move |value| Param::new(name, value)))
        .collect()
}

/// How form bodies are rendered on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormEncoding {
    /// `application/x-www-form-urlencoded`.
    #[default]
    UrlEncoded,
    /// Tab-separated `name:value` rendering, kept bit-for-bit for
    /// compatibility with recorded request expectations.
    Legacy,
}

impl FormEncoding {
    /// Content type sent with bodies in this encoding, if any.
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            FormEncoding::UrlEncoded => Some("application/x-www-form-urlencoded"),
            FormEncoding::Legacy => None,
        }
    }
}

/// Render parameters as a request body.
///
/// Returns `None` when there is nothing to send.
pub fn build_body(params: &[Param], encoding: FormEncoding) -> Option<String> {
    if params.is_empty() {
        return None;
    }

    let body = match encoding {
        FormEncoding::UrlEncoded => url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|p| (p.name(), p.value())))
            .finish(),
        FormEncoding::Legacy => {
            let mut body = String::from("\tformParams:");
            for param in params {
                body.push('\t');
                body.push_str(param.name());
                body.push(':');
                body.push_str(param.value());
            }
            body
        }
    };

    Some(body)
}
