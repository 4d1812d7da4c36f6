use std::{fmt, path::Path};

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

const MIB: u64 = 1024 * 1024;

/// Which upload service a field sends its files to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Audio,
}

impl UploadKind {
    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => &["image/jpeg", "image/png"],
            UploadKind::Audio => &["audio/mpeg", "audio/ogg", "audio/wav", "audio/x-wav"],
        }
    }

    /// Files must be strictly smaller than this.
    pub fn max_bytes(&self) -> u64 {
        match self {
            UploadKind::Image => 2 * MIB,
            UploadKind::Audio => 20 * MIB,
        }
    }

    /// Multipart field name expected by the upload service.
    pub fn form_field(&self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Audio => "song",
        }
    }

    /// Client-side gate run before anything touches the network.
    pub fn check(&self, file: &LocalFile) -> Result<(), UploadRejection> {
        let mime = file.mime.as_deref();
        if !mime.is_some_and(|m| self.allowed_mime_types().contains(&m)) {
            return Err(UploadRejection::UnsupportedType {
                kind: *self,
                found: file.mime.clone(),
            });
        }

        if file.size() >= self.max_bytes() {
            return Err(UploadRejection::TooLarge {
                limit_mib: self.max_bytes() / MIB,
                size: file.size(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::Image => f.write_str("JPG/PNG image"),
            UploadKind::Audio => f.write_str("audio file"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadRejection {
    #[error("You can only upload a {kind}")]
    UnsupportedType { kind: UploadKind, found: Option<String> },

    #[error("File must be smaller than {limit_mib}MB")]
    TooLarge { limit_mib: u64, size: u64 },
}

/// A file picked from disk, with its type sniffed from the content.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = infer::get(&bytes).map(|kind| kind.mime_type().to_string());
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Body returned by the upload services.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub data: UploadedPath,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedPath {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Done,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Uploading => f.write_str("uploading"),
            UploadStatus::Done => f.write_str("done"),
            UploadStatus::Error => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub uid: Uuid,
    pub name: String,
    pub status: UploadStatus,
    pub response: Option<UploadResponse>,
}

/// Every file pushed through one upload field, oldest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadDescriptor {
    pub file_list: Vec<UploadedFile>,
}

impl UploadDescriptor {
    pub fn begin(&mut self, name: impl Into<String>) -> Uuid {
        let uid = Uuid::new_v4();
        self.file_list.push(UploadedFile {
            uid,
            name: name.into(),
            status: UploadStatus::Uploading,
            response: None,
        });
        uid
    }

    pub fn complete(&mut self, uid: Uuid, response: UploadResponse) {
        if let Some(file) = self.file_list.iter_mut().find(|f| f.uid == uid) {
            file.status = UploadStatus::Done;
            file.response = Some(response);
        }
    }

    pub fn fail(&mut self, uid: Uuid) {
        if let Some(file) = self.file_list.iter_mut().find(|f| f.uid == uid) {
            file.status = UploadStatus::Error;
        }
    }

    pub fn last(&self) -> Option<&UploadedFile> {
        self.file_list.last()
    }

    pub fn is_uploading(&self) -> bool {
        self.last()
            .is_some_and(|f| f.status == UploadStatus::Uploading)
    }

    /// Server path from the most recent upload's response.
    pub fn storage_path(&self) -> Option<&str> {
        self.last()?
            .response
            .as_ref()
            .map(|r| r.data.path.as_str())
    }
}
