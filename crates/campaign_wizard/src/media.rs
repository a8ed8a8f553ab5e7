use std::{fmt, sync::Arc};

use anyhow::Result;
use thiserror::Error;

use crate::step::MediaAttachment;

pub const ALLOWED_MEDIA_TYPES: [&str; 2] = ["video/mp4", "video/quicktime"];
pub const MAX_VIDEO_DURATION_SECS: f64 = 15.0;

/// A file handed over by the picker, before it is allowed into the wizard.
#[derive(Clone)]
pub struct MediaCandidate {
    pub file_name: String,
    pub mime_type: String,
    /// Playback length as reported by the picker, if it could read one.
    pub duration_secs: Option<f64>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for MediaCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCandidate")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("duration_secs", &self.duration_secs)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaRejection {
    #[error("Unsupported video format ({0}). Upload an MP4 or MOV file.")]
    UnsupportedType(String),
    #[error("The selected video exceeds the 15 second limit ({0:.1}s).")]
    TooLong(f64),
    #[error("Could not read the duration of the selected video.")]
    UnknownDuration,
    #[error("The selected file is empty.")]
    Empty,
}

impl MediaCandidate {
    pub fn accept(self) -> Result<MediaAttachment, MediaRejection> {
        let essence = self
            .mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ALLOWED_MEDIA_TYPES.contains(&essence.as_str()) {
            return Err(MediaRejection::UnsupportedType(self.mime_type));
        }
        match self.duration_secs {
            None => return Err(MediaRejection::UnknownDuration),
            Some(d) if !d.is_finite() => return Err(MediaRejection::UnknownDuration),
            Some(d) if d > MAX_VIDEO_DURATION_SECS => return Err(MediaRejection::TooLong(d)),
            Some(_) => {}
        }
        if self.bytes.is_empty() {
            return Err(MediaRejection::Empty);
        }
        Ok(MediaAttachment {
            file_name: self.file_name,
            mime_type: essence,
            bytes: self.bytes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(pub String);

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out local preview handles for staged media. Every handle that
/// `open` returns is passed to `revoke` exactly once.
pub trait PreviewProvider: Send + Sync {
    fn open(&self, media: &MediaAttachment) -> Result<PreviewUrl>;
    fn revoke(&self, url: &PreviewUrl);
}

pub struct NoPreview;

impl PreviewProvider for NoPreview {
    fn open(&self, media: &MediaAttachment) -> Result<PreviewUrl> {
        Ok(PreviewUrl(format!("memory:{}", media.file_name)))
    }

    fn revoke(&self, _url: &PreviewUrl) {}
}

/// Owns one preview handle and revokes it when dropped.
pub struct PreviewLease {
    url: PreviewUrl,
    provider: Arc<dyn PreviewProvider>,
}

impl PreviewLease {
    pub fn open(provider: Arc<dyn PreviewProvider>, media: &MediaAttachment) -> Result<Self> {
        let url = provider.open(media)?;
        Ok(Self { url, provider })
    }

    pub fn url(&self) -> &PreviewUrl {
        &self.url
    }
}

impl Drop for PreviewLease {
    fn drop(&mut self) {
        self.provider.revoke(&self.url);
    }
}
