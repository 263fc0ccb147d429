use serde::{Deserialize, Serialize};

/// Save notification posted by the online document editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCallback {
    pub status: i64,
    #[serde(default)]
    pub url: Option<String>,
}

impl DocumentCallback {
    /// Document is ready for saving.
    pub const READY_FOR_SAVING: i64 = 2;
    /// Document was force-saved while still being edited.
    pub const FORCE_SAVED: i64 = 6;

    /// Whether this callback carries an edited document to store.
    pub fn has_document(&self) -> bool {
        matches!(self.status, Self::READY_FOR_SAVING | Self::FORCE_SAVED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_save_statuses_carry_documents() {
        for status in [2, 6] {
            let cb = DocumentCallback { status, url: None };
            assert!(cb.has_document());
        }
        for status in [0, 1, 3, 4, 7] {
            let cb = DocumentCallback { status, url: None };
            assert!(!cb.has_document());
        }
    }
}
