//! PDF upload with local validation ahead of the network call.

use reqwest::multipart::{Form, Part};
use shared::protocol::UploadResponse;
use tracing::info;

use crate::{
    decode_json,
    error::{ClientError, UploadError},
    QaClient, UPLOAD_PATH,
};

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const GENERIC_UPLOAD_FAILURE: &str = "Upload failed";

#[derive(Debug, Clone)]
pub struct PdfFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Type is checked before size.
pub fn validate(file: &PdfFile) -> Result<(), UploadError> {
    if file.mime_type != PDF_MIME_TYPE {
        return Err(UploadError::InvalidType {
            mime_type: file.mime_type.clone(),
        });
    }
    if file.size_bytes() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size_bytes: file.size_bytes(),
        });
    }
    Ok(())
}

impl QaClient {
    /// Validates `file` and, if it passes, posts it as the multipart field `file`.
    /// A rejected upload carries the backend's response body as its message.
    pub async fn upload_pdf(&self, file: PdfFile) -> Result<UploadResponse, UploadError> {
        validate(&file)?;
        let url = self.endpoint(UPLOAD_PATH)?;

        let size_bytes = file.size_bytes();
        let part = Part::bytes(file.bytes)
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)
            .map_err(ClientError::from)?;
        let form = Form::new().part("file", part);

        let res = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from)?;

        match decode_json::<UploadResponse>(res).await {
            Ok(uploaded) => {
                info!(
                    filename = %uploaded.filename,
                    size_bytes,
                    chunks = uploaded.chunks_count,
                    "pdf uploaded"
                );
                Ok(uploaded)
            }
            Err(ClientError::Status { body, .. }) if !body.trim().is_empty() => {
                Err(UploadError::Rejected(body))
            }
            Err(ClientError::Status { .. }) => {
                Err(UploadError::Rejected(GENERIC_UPLOAD_FAILURE.to_string()))
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_within_limit() {
        let file = PdfFile::new("q1.pdf", PDF_MIME_TYPE, vec![0; 5 * 1024 * 1024]);
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn accepts_pdf_at_exact_limit() {
        let file = PdfFile::new("q1.pdf", PDF_MIME_TYPE, vec![0; MAX_UPLOAD_BYTES as usize]);
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn rejects_non_pdf_before_checking_size() {
        let file = PdfFile::new("notes.txt", "text/plain", vec![0; 11 * 1024 * 1024]);
        let err = validate(&file).expect_err("must reject type");
        assert!(matches!(err, UploadError::InvalidType { ref mime_type } if mime_type == "text/plain"));
        assert_eq!(err.to_string(), "Only PDF files are allowed.");
    }

    #[test]
    fn rejects_oversized_pdf() {
        let file = PdfFile::new("big.pdf", PDF_MIME_TYPE, vec![0; 11 * 1024 * 1024]);
        let err = validate(&file).expect_err("must reject size");
        assert!(matches!(err, UploadError::TooLarge { size_bytes } if size_bytes == 11 * 1024 * 1024));
        assert_eq!(err.to_string(), "File size exceeds 10MB.");
    }
}
