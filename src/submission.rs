//! Parsing of multipart form submissions.
//!
//! Both record creation endpoints accept `multipart/form-data` with a handful
//! of text fields and at most one attached document. This module collects a
//! multipart stream into an easily queried form.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::Error;

/// A file uploaded as part of a form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    /// The file name as submitted by the client.
    pub original_filename: String,
    /// The full content of the uploaded file.
    pub bytes: Vec<u8>,
}

/// The collected fields of one multipart form submission.
#[derive(Debug)]
pub struct Submission {
    fields: HashMap<String, String>,
    /// The uploaded document, if the client attached one.
    pub document: Option<UploadedDocument>,
}

impl Submission {
    /// Read an entire multipart stream into a [Submission].
    ///
    /// The field named `document_field` is treated as the file upload; every
    /// other field is collected as text. A file part with an empty file name
    /// is treated as absent, which is how browsers submit an empty file
    /// input. Unknown extra fields are ignored.
    ///
    /// # Errors
    /// Returns [Error::Multipart] if the multipart stream cannot be read.
    pub async fn from_multipart(
        mut multipart: Multipart,
        document_field: &str,
    ) -> Result<Self, Error> {
        let mut fields = HashMap::new();
        let mut document = None;

        while let Some(field) = multipart.next_field().await.map_err(|error| {
            tracing::debug!("Could not read multipart field: {error}");
            Error::Multipart(error.to_string())
        })? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == document_field {
                let original_filename = match field.file_name() {
                    Some(file_name) if !file_name.is_empty() => file_name.to_owned(),
                    _ => continue,
                };

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| {
                        tracing::debug!("Could not read uploaded file: {error}");
                        Error::Multipart(error.to_string())
                    })?
                    .to_vec();

                tracing::debug!(
                    "Received file '{}' that is {} bytes",
                    original_filename,
                    bytes.len()
                );

                document = Some(UploadedDocument {
                    original_filename,
                    bytes,
                });
            } else {
                let value = field.text().await.map_err(|error| {
                    tracing::debug!("Could not read multipart field '{name}': {error}");
                    Error::Multipart(error.to_string())
                })?;
                fields.insert(name, value);
            }
        }

        Ok(Self { fields, document })
    }

    /// Get a required text field.
    ///
    /// # Errors
    /// Returns [Error::MissingField] if the field is absent or empty.
    pub fn required(&self, name: &str) -> Result<&str, Error> {
        match self.fields.get(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::MissingField(name.to_owned())),
        }
    }

    /// Get a required decimal field.
    ///
    /// # Errors
    /// Returns [Error::MissingField] if the field is absent or empty, or
    /// [Error::InvalidField] if the value is not a number.
    pub fn required_amount(&self, name: &str) -> Result<f64, Error> {
        self.required(name)?
            .parse()
            .map_err(|_| Error::InvalidField(name.to_owned(), "expected a number".to_owned()))
    }

    /// Get an optional text field. Absent and empty fields yield `None`.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod submission_tests {
    use axum::{
        body::Body,
        extract::{FromRequest, Multipart},
        http::{Request, header::CONTENT_TYPE},
    };

    use crate::{Error, submission::Submission};

    const BOUNDARY: &str = "test-boundary";

    /// Build a [Multipart] extractor from (name, file name, content) parts.
    async fn make_multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Multipart {
        let mut body = Vec::new();

        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &())
            .await
            .expect("could not create multipart extractor")
    }

    #[tokio::test]
    async fn collects_text_fields_and_document() {
        let multipart = make_multipart(&[
            ("name", None, b"Coffee"),
            ("amount", None, b"4.50"),
            ("receipt", Some("coffee.png"), b"pixels"),
        ])
        .await;

        let submission = Submission::from_multipart(multipart, "receipt")
            .await
            .unwrap();

        assert_eq!(submission.required("name").unwrap(), "Coffee");
        assert_eq!(submission.required_amount("amount").unwrap(), 4.50);

        let document = submission.document.expect("document should be captured");
        assert_eq!(document.original_filename, "coffee.png");
        assert_eq!(document.bytes, b"pixels");
    }

    #[tokio::test]
    async fn missing_required_field_is_an_error() {
        let multipart = make_multipart(&[("name", None, b"Coffee")]).await;

        let submission = Submission::from_multipart(multipart, "receipt")
            .await
            .unwrap();

        assert_eq!(
            submission.required("amount"),
            Err(Error::MissingField("amount".to_owned()))
        );
    }

    #[tokio::test]
    async fn empty_required_field_is_an_error() {
        let multipart = make_multipart(&[("date", None, b"")]).await;

        let submission = Submission::from_multipart(multipart, "receipt")
            .await
            .unwrap();

        assert_eq!(
            submission.required("date"),
            Err(Error::MissingField("date".to_owned()))
        );
    }

    #[tokio::test]
    async fn non_numeric_amount_is_an_error() {
        let multipart = make_multipart(&[("amount", None, b"four fifty")]).await;

        let submission = Submission::from_multipart(multipart, "receipt")
            .await
            .unwrap();

        assert_eq!(
            submission.required_amount("amount"),
            Err(Error::InvalidField(
                "amount".to_owned(),
                "expected a number".to_owned()
            ))
        );
    }

    #[tokio::test]
    async fn file_part_with_empty_filename_is_treated_as_absent() {
        let multipart =
            make_multipart(&[("name", None, b"Coffee"), ("receipt", Some(""), b"")]).await;

        let submission = Submission::from_multipart(multipart, "receipt")
            .await
            .unwrap();

        assert_eq!(submission.document, None);
    }

    #[tokio::test]
    async fn optional_field_defaults_to_none() {
        let multipart = make_multipart(&[("name", None, b"Coffee"), ("notes", None, b"")]).await;

        let submission = Submission::from_multipart(multipart, "receipt")
            .await
            .unwrap();

        assert_eq!(submission.optional("notes"), None);
        assert_eq!(submission.optional("missing"), None);
    }

    #[tokio::test]
    async fn unknown_extra_fields_are_ignored() {
        let multipart = make_multipart(&[("name", None, b"Coffee"), ("surprise", None, b"!")]).await;

        let submission = Submission::from_multipart(multipart, "receipt")
            .await
            .unwrap();

        assert_eq!(submission.required("name").unwrap(), "Coffee");
    }
}
