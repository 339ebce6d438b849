use std::collections::HashMap;

use axum::extract::Multipart;

use super::{to_data_url, MediaError};
use crate::config::UploadConfig;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn to_data_url(&self) -> String {
        to_data_url(&self.content_type, &self.bytes)
    }
}

/// A fully buffered multipart body: text fields by name plus the uploaded files
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// Drain `multipart`, enforcing the file count and per-file size limits
    pub async fn parse(mut multipart: Multipart, limits: &UploadConfig) -> Result<Self, MediaError> {
        let mut form = MultipartForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| MediaError::Malformed(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| MediaError::Malformed(e.to_string()))?;
                form.fields.entry(name).or_default().push(value);
                continue;
            };

            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| MediaError::Malformed(e.to_string()))?
            {
                if bytes.len() + chunk.len() > limits.max_file_bytes {
                    return Err(MediaError::FileTooLarge {
                        name: file_name,
                        limit: limits.max_file_bytes,
                    });
                }
                bytes.extend_from_slice(&chunk);
            }

            // Browsers submit an empty part for an unused file input
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }

            if form.files.len() >= limits.max_files {
                return Err(MediaError::TooManyFiles(limits.max_files));
            }

            form.files.push(UploadedFile {
                field: name,
                file_name,
                content_type,
                bytes,
            });
        }

        Ok(form)
    }

    /// First value of a text field, trimmed. Blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// First value exactly as sent, for fields where whitespace is significant
    pub fn raw(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .filter(|v| !v.is_empty())
            .cloned()
    }

    /// Every value sent under `name` or its `name[]` spelling
    pub fn values(&self, name: &str) -> Vec<String> {
        let bracketed = format!("{}[]", name);
        [name, bracketed.as_str()]
            .iter()
            .filter_map(|key| self.fields.get(*key))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    #[cfg(test)]
    pub(crate) fn with_fields(pairs: &[(&str, &str)]) -> Self {
        let mut form = MultipartForm::default();
        for (key, value) in pairs {
            form.fields.entry(key.to_string()).or_default().push(value.to_string());
        }
        form
    }
}
