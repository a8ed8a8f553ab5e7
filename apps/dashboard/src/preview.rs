use std::{
    collections::HashMap,
    io::Write,
    path::Path,
    sync::{Mutex, PoisonError},
};

use anyhow::{Context, Result};
use campaign_wizard::{MediaAttachment, PreviewProvider, PreviewUrl};
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes staged media to temporary files so an external player can open
/// them. A revoked preview deletes its file.
#[derive(Default)]
pub struct TempFilePreviews {
    files: Mutex<HashMap<String, NamedTempFile>>,
}

impl TempFilePreviews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl PreviewProvider for TempFilePreviews {
    fn open(&self, media: &MediaAttachment) -> Result<PreviewUrl> {
        let suffix = Path::new(&media.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("campaign-preview-")
            .suffix(&suffix)
            .tempfile()
            .context("failed to create preview file")?;
        file.write_all(&media.bytes)
            .context("failed to write preview file")?;

        let url = format!("file://{}", file.path().display());
        debug!(%url, size = media.bytes.len(), "preview opened");
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), file);
        Ok(PreviewUrl(url))
    }

    fn revoke(&self, url: &PreviewUrl) {
        let removed = self
            .files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&url.0);
        if removed.is_some() {
            debug!(url = %url.0, "preview revoked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoking_deletes_the_file() {
        let previews = TempFilePreviews::new();
        let media = MediaAttachment {
            file_name: "clip.mp4".into(),
            mime_type: "video/mp4".into(),
            bytes: vec![1, 2, 3, 4],
        };
        let url = previews.open(&media).expect("open");
        let path = url.0.trim_start_matches("file://").to_string();
        assert!(path.ends_with(".mp4"));
        assert_eq!(std::fs::read(&path).expect("read"), vec![1, 2, 3, 4]);
        assert_eq!(previews.open_count(), 1);

        previews.revoke(&url);
        assert_eq!(previews.open_count(), 0);
        assert!(!Path::new(&path).exists());
    }
}
