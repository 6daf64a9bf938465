//! Registration requests and the uploader capability.
//!
//! A request is one `multipart/form-data` body: a `params` JSON part followed
//! by one `images` part per photo, in slot order. How the body reaches the
//! marketplace is left to a [`ProductUploader`].

use crate::validation::PostParameter;
use openmarket_image::EncodedImage;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by an uploader.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request could not be delivered
    #[error("Transport error: {0}")]
    Transport(String),

    /// The marketplace refused the request
    #[error("Rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Response message
        message: String,
    },

    /// Params could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Acknowledgement of a delivered request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// Id of the request that was sent
    pub request_id: Uuid,
    /// Body size in bytes
    pub body_len: usize,
}

/// Something that can deliver a registration request.
pub trait ProductUploader {
    /// Deliver `request`.
    fn upload(&self, request: &RegistrationRequest) -> Result<UploadReceipt, UploadError>;
}

/// A complete product registration.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    id: Uuid,
    params: PostParameter,
    images: Vec<EncodedImage>,
}

impl RegistrationRequest {
    /// New request with a fresh id.
    pub fn new(params: PostParameter, images: Vec<EncodedImage>) -> Self {
        Self::with_id(Uuid::new_v4(), params, images)
    }

    /// New request with an explicit id.
    pub fn with_id(id: Uuid, params: PostParameter, images: Vec<EncodedImage>) -> Self {
        Self { id, params, images }
    }

    /// Request id, also used as the boundary and file name stem.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Listing fields.
    pub fn params(&self) -> &PostParameter {
        &self.params
    }

    /// Photos in slot order.
    pub fn images(&self) -> &[EncodedImage] {
        &self.images
    }

    /// Multipart boundary derived from the id.
    pub fn boundary(&self) -> String {
        format!("openmarket-{}", self.id.simple())
    }

    /// `Content-Type` header value for [`multipart_body`](Self::multipart_body).
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary())
    }

    /// Serialize the request as `multipart/form-data`.
    pub fn multipart_body(&self) -> Result<Vec<u8>, UploadError> {
        let boundary = self.boundary();
        let mut body = Vec::new();

        write!(
            body,
            "--{boundary}\r\nContent-Disposition: form-data; name=\"params\"\r\nContent-Type: application/json\r\n\r\n"
        )?;
        serde_json::to_writer(&mut body, &self.params)?;
        body.extend_from_slice(b"\r\n");

        for (i, image) in self.images.iter().enumerate() {
            let extension = image.format().extensions()[0];
            write!(
                body,
                "--{boundary}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}-{}.{}\"\r\nContent-Type: {}\r\n\r\n",
                self.id.simple(),
                i + 1,
                extension,
                image.mime_type()
            )?;
            body.extend_from_slice(image.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        write!(body, "--{boundary}--\r\n")?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use openmarket_image::ImageFormat;

    fn params() -> PostParameter {
        PostParameter {
            name: "Mug".into(),
            description: "Stoneware mug".into(),
            price: 12.5,
            currency: Currency::Usd,
            discounted_price: 0.0,
            stock: None,
        }
    }

    fn fake_jpeg(marker: u8) -> EncodedImage {
        EncodedImage::new(vec![0xFF, 0xD8, 0xFF, marker], ImageFormat::Jpeg, 4, 4)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_multipart_layout() {
        let request = RegistrationRequest::with_id(
            Uuid::nil(),
            params(),
            vec![fake_jpeg(0x01), fake_jpeg(0x02)],
        );
        let body = request.multipart_body().unwrap();
        let boundary = request.boundary();

        assert_eq!(count(&body, format!("--{boundary}\r\n").as_bytes()), 3);
        assert!(body.ends_with(format!("--{boundary}--\r\n").as_bytes()));
        assert_eq!(count(&body, b"name=\"images\""), 2);
        assert_eq!(count(&body, b"Content-Type: image/jpeg"), 2);
        assert_eq!(count(&body, b"\"currency\":\"USD\""), 1);

        let params_at = position_of(&body, b"name=\"params\"");
        let images_at = position_of(&body, b"name=\"images\"");
        assert!(params_at < images_at);
    }

    fn position_of(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap_or(usize::MAX)
    }

    #[test]
    fn test_file_names_use_request_id() {
        let request = RegistrationRequest::with_id(Uuid::nil(), params(), vec![fake_jpeg(0x01)]);
        let body = request.multipart_body().unwrap();
        let expected = format!("filename=\"{}-1.jpg\"", Uuid::nil().simple());
        assert_eq!(count(&body, expected.as_bytes()), 1);
    }

    #[test]
    fn test_content_type_carries_boundary() {
        let request = RegistrationRequest::new(params(), Vec::new());
        assert!(request.content_type().ends_with(&request.boundary()));
        assert_ne!(request.id(), Uuid::nil());
    }
}
