use serde::{Deserialize, Serialize};

use crate::service::ArchiveEntry;

/// Body of `POST /download/folder`.
///
/// `files` is a list of `[key, displayName]` pairs in archive order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveFolder {
    #[serde(default)]
    pub files: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub folder_name: Option<String>,
}

impl ArchiveFolder {
    /// Name used for the downloaded file when the client sends none.
    pub const DEFAULT_NAME: &str = "archive";

    /// Archive entries in request order.
    pub fn entries(&self) -> Vec<ArchiveEntry> {
        self.files
            .iter()
            .flatten()
            .map(|(key, name)| ArchiveEntry::new(key.clone(), name.clone()))
            .collect()
    }

    /// Download file name (`<folderName>.zip`), stripped of characters that
    /// cannot appear inside a quoted header parameter.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .folder_name
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
            .collect();
        let stem = stem.trim();
        let stem = if stem.is_empty() { Self::DEFAULT_NAME } else { stem };
        format!("{stem}.zip")
    }
}
