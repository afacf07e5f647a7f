//! REST-shaped resource layer
//!
//! Transport-free responses and errors: a status, the alert headers a web
//! front end would emit, and a body. A transport only has to copy them out.

pub mod conferences;

pub use conferences::ConferenceResource;

use serde::Serialize;

pub use http::StatusCode;

fn serialize_status<S: serde::Serializer>(
    status: &StatusCode,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

/// Successful resource call
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
    /// Set when the primary store committed but the search index did not follow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_warning: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, body: Option<T>) -> Self {
        Self {
            status,
            location: None,
            headers: Vec::new(),
            body,
            index_warning: None,
        }
    }

    pub fn ok(body: T) -> Self {
        Self::new(StatusCode::OK, Some(body))
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_index_warning(mut self, warning: Option<String>) -> Self {
        self.index_warning = warning;
        self
    }

    /// Look up a header by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Rejected resource call
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub entity_name: String,
    pub error_key: String,
    pub message: String,
    pub headers: Vec<(String, String)>,
}

impl ApiError {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Alert header names for an application
pub(crate) struct AlertHeaders<'a> {
    application_name: &'a str,
}

impl<'a> AlertHeaders<'a> {
    pub(crate) fn new(application_name: &'a str) -> Self {
        Self { application_name }
    }

    pub(crate) fn alert(&self, entity: &str, action: &str) -> (String, String) {
        (
            format!("X-{}-alert", self.application_name),
            format!("{}.{}.{}", self.application_name, entity, action),
        )
    }

    pub(crate) fn params(&self, id: i64) -> (String, String) {
        (format!("X-{}-params", self.application_name), id.to_string())
    }

    pub(crate) fn error(&self, key: &str) -> (String, String) {
        (
            format!("X-{}-error", self.application_name),
            format!("error.{}", key),
        )
    }
}
