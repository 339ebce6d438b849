//! Uploaded media handling.
//!
//! Files arrive as multipart parts and are stored inline as `data:` URLs,
//! split into images and videos by their declared content type.

pub mod multipart;

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

pub use multipart::{MultipartForm, UploadedFile};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("Too many files: at most {0} allowed")]
    TooManyFiles(usize),

    #[error("File '{name}' exceeds the {limit} byte limit")]
    FileTooLarge { name: String, limit: usize },

    #[error("Invalid multipart body: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Unrecognised content types yield `None` and are dropped by callers
    pub fn classify(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// `data:<mime>;base64,<payload>`
pub fn to_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Encoded uploads split by kind, in upload order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Media {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

impl Media {
    pub fn from_files(files: &[UploadedFile]) -> Self {
        let mut media = Media::default();
        for file in files {
            match MediaKind::classify(&file.content_type) {
                Some(MediaKind::Image) => media.images.push(file.to_data_url()),
                Some(MediaKind::Video) => media.videos.push(file.to_data_url()),
                None => {
                    tracing::debug!("Dropping upload '{}' with type {}", file.file_name, file.content_type);
                }
            }
        }
        media
    }
}

/// List field values: a lone JSON array string is expanded, anything else is taken
/// literally, so an entry such as `[Day 1] sunrise` survives. Blank entries are dropped.
pub fn parse_list(raw: &[String]) -> Vec<String> {
    let items = match raw {
        [single] if single.trim_start().starts_with('[') => {
            serde_json::from_str::<Vec<String>>(single.trim()).unwrap_or_else(|_| vec![single.clone()])
        }
        _ => raw.to_vec(),
    };

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
