//! Request description passed through the authenticated wrapper.
//!
//! An `ApiRequest` is plain data so it can be sent twice: once with the
//! current access token and, after a successful refresh, once more with the
//! new one.

use std::path::Path;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::{Error, Result};

/// A file attached to an upload request.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Multipart field name.
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Create a part under the conventional `file` field.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut part = Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        if let Some(content_type) = &self.content_type {
            part = part.mime_str(content_type)?;
        }
        Ok(Form::new().part(self.field.clone(), part))
    }
}

/// Body of an API request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// JSON-encoded body; the wrapper sets the JSON content type.
    Json(serde_json::Value),
    /// Multipart upload; the HTTP stack sets the content type and boundary.
    Multipart(FilePart),
}

/// A pending API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<serde_json::Value>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: RequestBody,
    pub(crate) refresh_on_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            refresh_on_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a file upload.
    pub fn file(mut self, part: FilePart) -> Self {
        self.body = RequestBody::Multipart(part);
        self
    }

    /// Attach query parameters.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        self.query = Some(serde_json::to_value(query)?);
        Ok(self)
    }

    /// Add or override a request header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Treat a 401 as a final answer instead of a stale session.
    ///
    /// Used for credential exchanges, where a 401 means wrong credentials.
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body() {
        let request = ApiRequest::post("admin/clients")
            .json(&serde_json::json!({"full_name": "Ana"}))
            .unwrap();
        assert!(matches!(request.body(), RequestBody::Json(v) if v["full_name"] == "Ana"));
        assert!(request.refresh_on_unauthorized);
    }

    #[test]
    fn test_without_refresh() {
        let request = ApiRequest::post("auth/login").without_refresh();
        assert!(!request.refresh_on_unauthorized);
    }

    #[test]
    fn test_file_part_form() {
        let part = FilePart::new("contract.pdf", b"%PDF-1.4".to_vec())
            .with_content_type("application/pdf");
        assert_eq!(part.field, "file");
        assert!(part.to_form().is_ok());

        let bad = FilePart::new("x", Vec::new()).with_content_type("not a mime");
        assert!(bad.to_form().is_err());
    }

    #[tokio::test]
    async fn test_file_part_from_missing_path() {
        let err = FilePart::from_path(Path::new("/nonexistent/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::File { .. }));
    }
}
