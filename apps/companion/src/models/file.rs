use std::path::Path;

use bytes::Bytes;

use crate::errors::AnalysisError;

/// A resume file as captured by the file selector.
///
/// Contents are held in memory and cheap to clone; the controller keeps the
/// current one until another selection replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    contents: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Reads a file from disk, naming it after the last path component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, contents))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &Bytes {
        &self.contents
    }

    pub fn size(&self) -> usize {
        self.contents.len()
    }

    /// Lowercased extension without the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// MIME type sent with the multipart part. Unknown types go out as octet-stream.
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/octet-stream",
        }
    }
}
