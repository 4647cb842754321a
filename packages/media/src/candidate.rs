//! Import inputs: candidate files and drag/paste payloads

use std::path::Path;
use std::sync::Arc;

use crate::{MediaConfig, ValidationError};

/// File name used for files fetched from an external URL
pub const EXTERNAL_FILE_NAME: &str = "external";

/// Where a candidate file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Dropped, pasted or picked from the user's machine
    Local,
    /// Fetched from a URI found in the payload
    ExternalUrl(String),
}

/// A raw file waiting to be imported
#[derive(Debug, Clone)]
pub struct ImportCandidate {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
    pub provenance: Provenance,
}

impl ImportCandidate {
    pub fn local(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
            provenance: Provenance::Local,
        }
    }

    pub fn external(uri: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: EXTERNAL_FILE_NAME.to_string(),
            mime: mime.into(),
            bytes: bytes.into(),
            provenance: Provenance::ExternalUrl(uri.into()),
        }
    }

    /// Read a local file, guessing its mime type from the extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = image::ImageFormat::from_path(path)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());

        Ok(Self::local(name, mime, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Accessible text of the node this file becomes
    pub fn accessible_text(&self, config: &MediaConfig) -> String {
        match self.provenance {
            Provenance::Local => self.name.clone(),
            Provenance::ExternalUrl(_) => config.external_alt_text.clone(),
        }
    }

    /// Synchronous checks, in order: mime type, then size
    pub fn validate(&self, config: &MediaConfig) -> Result<(), ValidationError> {
        if !self.mime.starts_with("image") {
            return Err(ValidationError::NotAnImage {
                name: self.name.clone(),
                mime: self.mime.clone(),
            });
        }

        if self.size() > config.max_file_size {
            return Err(ValidationError::TooLarge {
                name: self.name.clone(),
                size: self.size(),
                max: config.max_file_size,
            });
        }

        Ok(())
    }
}

/// Payload of a drop or paste
#[derive(Debug, Clone, Default)]
pub struct DataTransfer {
    pub files: Vec<ImportCandidate>,
    pub uris: Vec<String>,
    pub text: Option<String>,
}

impl DataTransfer {
    pub fn files(files: Vec<ImportCandidate>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    /// Payload carrying a `text/uri-list` item
    pub fn uri_list(list: &str) -> Self {
        Self {
            uris: parse_uri_list(list),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Parse a `text/uri-list` body: one URI per line, `#` starts a comment
pub fn parse_uri_list(list: &str) -> Vec<String> {
    list.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_order() {
        let config = MediaConfig::default();

        // Wrong type and too large: type is reported first
        let pdf = ImportCandidate::local("a.pdf", "application/pdf", vec![0u8; 3_000_000]);
        assert!(matches!(pdf.validate(&config), Err(ValidationError::NotAnImage { .. })));

        let big = ImportCandidate::local("a.png", "image/png", vec![0u8; 3_000_000]);
        assert_eq!(
            big.validate(&config),
            Err(ValidationError::TooLarge {
                name: "a.png".to_string(),
                size: 3_000_000,
                max: 2_000_000,
            })
        );

        let ok = ImportCandidate::local("a.png", "image/png", vec![0u8; 2_000_000]);
        assert!(ok.validate(&config).is_ok());
    }

    #[test]
    fn test_accessible_text() {
        let config = MediaConfig::default();

        let local = ImportCandidate::local("capture écran.png", "image/png", vec![1u8]);
        assert_eq!(local.accessible_text(&config), "capture écran.png");

        let external = ImportCandidate::external("https://x.test/a.png", "image/png", vec![1u8]);
        assert_eq!(external.name, EXTERNAL_FILE_NAME);
        assert_eq!(external.accessible_text(&config), "Image insérée");
    }

    #[test]
    fn test_parse_uri_list() {
        let list = "# dragged from browser\r\nhttps://a.test/1.png\r\n\r\nhttps://a.test/2.png\n";
        assert_eq!(parse_uri_list(list), vec!["https://a.test/1.png", "https://a.test/2.png"]);
    }

    #[test]
    fn test_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let candidate = ImportCandidate::from_path(&path).unwrap();
        assert_eq!(candidate.name, "shot.png");
        assert_eq!(candidate.mime, "image/png");
        assert_eq!(candidate.provenance, Provenance::Local);

        let other = dir.path().join("notes.txt");
        std::fs::write(&other, b"text").unwrap();
        assert_eq!(ImportCandidate::from_path(&other).unwrap().mime, "application/octet-stream");
    }
}
