//! Core types for image editing.

use crate::error::{EditError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output size requested from the edit endpoint for every run.
pub const EDIT_SIZE: &str = "1024x1024";

/// Prompt used when the caller provides none.
pub const DEFAULT_PROMPT: &str = "update this image to be set in a pirate era";

/// Model variants served by the edit endpoint.
///
/// Each variant routes to its own deployment and contributes its own
/// quality fields to the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditModel {
    /// GPT image deployment.
    #[default]
    Gpt,
    /// Flux deployment.
    Flux,
}

impl EditModel {
    /// Returns the short model name used in logs and filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt => "gpt",
            Self::Flux => "flux",
        }
    }

    /// Parses a model name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gpt" => Some(Self::Gpt),
            "flux" => Some(Self::Flux),
            _ => None,
        }
    }

    /// Multipart text fields specific to this model.
    ///
    /// GPT edits request high input fidelity; Flux uses the `hd` quality
    /// tier. These are the only fields that differ between the variants.
    pub fn form_fields(&self) -> Vec<(&'static str, &'static str)> {
        match self {
            Self::Gpt => vec![("input_fidelity", "high"), ("quality", "high")],
            Self::Flux => vec![("quality", "hd")],
        }
    }
}

impl std::fmt::Display for EditModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported input image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// A request to edit one image with a text instruction.
///
/// Exactly one image is attached. The struct is built once per invocation
/// and not mutated afterwards.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// The edit instruction.
    pub prompt: String,
    /// Raw bytes of the input image.
    pub image: Vec<u8>,
    /// Base filename the image is uploaded under.
    pub image_filename: String,
    /// Number of images to generate.
    pub n: u32,
    /// Requested output size.
    pub size: String,
}

impl EditRequest {
    /// Creates a request from in-memory image bytes.
    pub fn new(
        prompt: impl Into<String>,
        image: Vec<u8>,
        image_filename: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            image,
            image_filename: image_filename.into(),
            n: 1,
            size: EDIT_SIZE.to_string(),
        }
    }

    /// Creates a request by reading the image from disk.
    ///
    /// The file is read eagerly so an unreadable path fails with
    /// [`EditError::FileAccess`] before any network activity.
    pub fn from_file(prompt: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = std::fs::read(path).map_err(|source| EditError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let image_filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image.png")
            .to_string();
        Ok(Self::new(prompt, image, image_filename))
    }

    /// Detects the input image's format from its magic bytes.
    pub fn image_format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.image)
    }
}

/// Raw outcome of one edit call: the undigested JSON body plus timing.
///
/// The client never interprets the body's shape; pass it to
/// [`materialize`](crate::edit::materialize) to decode and save the images.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// The response body as generic JSON.
    pub raw: serde_json::Value,
    /// Wall-clock time of the HTTP exchange.
    pub elapsed: Duration,
    /// Model the request was routed to.
    pub model: EditModel,
    /// Deployment name that served the request.
    pub deployment: String,
}

/// The response shape the materializer expects.
#[derive(Debug, Deserialize)]
pub struct EditResponse {
    /// Generated images, in order.
    pub data: Vec<EditImage>,
}

/// One generated image entry.
#[derive(Debug, Deserialize)]
pub struct EditImage {
    /// The image as base64-encoded bytes.
    pub b64_json: String,
}

/// A file written by the materializer.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// Where the image was written.
    pub path: PathBuf,
    /// Size of the written file in bytes.
    pub bytes: usize,
    /// 1-based position within the response's `data` array.
    pub index: usize,
}
