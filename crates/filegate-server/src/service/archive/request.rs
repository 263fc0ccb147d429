//! Archive request types.

use super::ArchiveError;

/// One stored object and the name it gets inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    key: String,
    name: String,
}

impl ArchiveEntry {
    /// Creates an entry reading `key` and storing it as `name`.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }

    /// Object key, without the namespace prefix.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name inside the archive.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A non-empty, ordered list of entries to pack into one archive.
///
/// Display names need not be unique; every entry becomes its own archive
/// entry under its name, duplicates included.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveRequest {
    /// Validates a list of entries.
    pub fn new(entries: Vec<ArchiveEntry>) -> Result<Self, ArchiveError> {
        if entries.is_empty() {
            return Err(ArchiveError::Empty);
        }

        Ok(Self { entries })
    }

    /// Entries in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; empty requests are rejected by [`ArchiveRequest::new`].
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<ArchiveEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(request: &ArchiveRequest) -> Vec<&str> {
        request.entries().iter().map(ArchiveEntry::name).collect()
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(
            ArchiveRequest::new(Vec::new()),
            Err(ArchiveError::Empty)
        ));
    }

    #[test]
    fn order_is_kept() {
        let request = ArchiveRequest::new(vec![
            ArchiveEntry::new("k2", "b.txt"),
            ArchiveEntry::new("k1", "a.txt"),
        ])
        .unwrap();
        assert_eq!(names(&request), ["b.txt", "a.txt"]);
        assert_eq!(request.entries()[0].key(), "k2");
    }

    #[test]
    fn duplicate_names_are_kept() {
        let request = ArchiveRequest::new(vec![
            ArchiveEntry::new("k1", "report.pdf"),
            ArchiveEntry::new("k2", "report.pdf"),
            ArchiveEntry::new("k3", "notes"),
        ])
        .unwrap();
        assert_eq!(names(&request), ["report.pdf", "report.pdf", "notes"]);
        assert_eq!(request.entries()[1].key(), "k2");
    }
}
