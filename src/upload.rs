//! Turns a movie form submission into [`MovieFormInput`].
//!
//! Both `multipart/form-data` (the normal case, since the form carries a
//! cover image) and plain `application/x-www-form-urlencoded` bodies are
//! accepted. Only the known movie keys are kept; anything else is dropped.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};

use crate::error::AppError;

/// How far into an upload to look for an SVG root element.
const SVG_SNIFF_BYTES: usize = 1024;

/// A file part of the form, held in memory until it is stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Lowercased extension of the client-supplied file name, if it is a
    /// plain alphanumeric one.
    pub fn client_extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Media type detected from the file's leading bytes. The client's
    /// `Content-Type` plays no part.
    pub fn detected_mime(&self) -> Option<&'static str> {
        if looks_like_svg(&self.bytes) {
            return Some("image/svg+xml");
        }
        infer::get(&self.bytes).map(|kind| kind.mime_type())
    }

    /// Extension implied by the detected content, falling back to the
    /// client's.
    pub fn guess_extension(&self) -> String {
        let detected = if looks_like_svg(&self.bytes) {
            Some("svg")
        } else {
            infer::get(&self.bytes).map(|kind| kind.extension())
        };

        detected
            .map(str::to_string)
            .or_else(|| self.client_extension())
            .unwrap_or_else(|| "bin".to_string())
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// An SVG is text, so magic numbers do not find it: look for an `<svg` root,
/// optionally behind an XML declaration, doctype or comments.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_BYTES)];
    let head = head.strip_prefix(b"\xef\xbb\xbf").unwrap_or(head);
    let text = String::from_utf8_lossy(head).to_ascii_lowercase();
    let text = text.trim_start();

    text.starts_with("<svg")
        || ((text.starts_with("<?xml") || text.starts_with("<!doctype svg") || text.starts_with("<!--"))
            && text.contains("<svg"))
}

/// Raw, unvalidated movie form.
#[derive(Debug, Default, Clone)]
pub struct MovieFormInput {
    pub judul: Option<String>,
    pub category_id: Option<String>,
    pub sinopsis: Option<String>,
    pub tahun: Option<String>,
    pub pemain: Option<String>,
    pub foto_sampul: Option<UploadedFile>,
}

impl MovieFormInput {
    fn set_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "judul" => &mut self.judul,
            "category_id" => &mut self.category_id,
            "sinopsis" => &mut self.sinopsis,
            "tahun" => &mut self.tahun,
            "pemain" => &mut self.pemain,
            _ => return,
        };
        *slot = Some(value);
    }

    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut input = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            if name == "foto_sampul" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                // Browsers send an empty part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                input.foto_sampul = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            } else if matches!(
                name.as_str(),
                "judul" | "category_id" | "sinopsis" | "tahun" | "pemain"
            ) {
                let text = field.text().await?;
                input.set_text(&name, text);
            }
        }

        Ok(input)
    }

    pub fn from_pairs(pairs: HashMap<String, String>) -> Self {
        let mut input = Self::default();
        for (name, value) in pairs {
            input.set_text(&name, value);
        }
        input
    }

    /// Text fields to repopulate the form with after a failed submission.
    pub fn old_input(&self) -> BTreeMap<String, String> {
        [
            ("judul", &self.judul),
            ("category_id", &self.category_id),
            ("sinopsis", &self.sinopsis),
            ("tahun", &self.tahun),
            ("pemain", &self.pemain),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_ref()
                .map(|v| (name.to_string(), v.clone()))
        })
        .collect()
    }
}

#[async_trait]
impl<S> FromRequest<S> for MovieFormInput
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let Form(pairs) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            Ok(Self::from_pairs(pairs))
        }
    }
}
