use std::fmt;

use super::upload_id::UploadId;

const STAGED_STEM: &str = "audio";
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// Builds `<upload-uuid>/audio[.ext]`. Only a short ASCII alphanumeric
    /// extension survives from the client filename, so the on-disk name
    /// stays bounded whatever the client sends.
    pub fn new(upload_id: &UploadId, filename: &str) -> Self {
        let name = match staged_extension(filename) {
            Some(ext) => format!("{}.{}", STAGED_STEM, ext),
            None => STAGED_STEM.to_string(),
        };

        Self(format!("{}/{}", upload_id.as_uuid(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn staged_extension(filename: &str) -> Option<String> {
    let last = filename.rsplit(|c| c == '/' || c == '\\').next()?.trim();
    let (stem, ext) = last.rsplit_once('.')?;

    let usable = !stem.trim_start_matches('.').is_empty()
        && (1..=MAX_EXTENSION_LEN).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric());

    usable.then(|| ext.to_ascii_lowercase())
}
