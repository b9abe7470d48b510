use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// An attachment already persisted on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptRef {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub size_bytes: u64,
    pub uploaded_at: NaiveDate,
}

/// A local file queued for upload after the next successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReceipt {
    pub path: PathBuf,
    pub filename: String,
}

impl PendingReceipt {
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, filename }
    }
}

/// Staged receipt changes.
///
/// Deletions of persisted receipts and new uploads are staged here and only
/// executed by the frontend after the transaction write succeeds; closing the
/// form discards the staging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptStaging {
    pub existing: Vec<ReceiptRef>,
    staged_deletes: Vec<i64>,
    pending: Vec<PendingReceipt>,
}

impl ReceiptStaging {
    #[must_use]
    pub fn with_existing(existing: Vec<ReceiptRef>) -> Self {
        Self {
            existing,
            ..Default::default()
        }
    }

    /// Marks a persisted receipt for deletion. Toggling twice un-stages it.
    pub fn toggle_delete(&mut self, id: i64) -> bool {
        if !self.existing.iter().any(|receipt| receipt.id == id) {
            return false;
        }
        if let Some(pos) = self.staged_deletes.iter().position(|&staged| staged == id) {
            self.staged_deletes.remove(pos);
        } else {
            self.staged_deletes.push(id);
        }
        true
    }

    #[must_use]
    pub fn is_delete_staged(&self, id: i64) -> bool {
        self.staged_deletes.contains(&id)
    }

    #[must_use]
    pub fn staged_deletes(&self) -> &[i64] {
        &self.staged_deletes
    }

    pub fn queue_upload(&mut self, path: impl AsRef<Path>) {
        self.pending.push(PendingReceipt::from_path(path.as_ref()));
    }

    #[must_use]
    pub fn pending(&self) -> &[PendingReceipt] {
        &self.pending
    }

    pub fn remove_pending(&mut self, index: usize) -> Option<PendingReceipt> {
        if index < self.pending.len() {
            Some(self.pending.remove(index))
        } else {
            None
        }
    }

    /// True when saving would trigger an attachment sync batch.
    #[must_use]
    pub fn has_work(&self) -> bool {
        !self.staged_deletes.is_empty() || !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(id: i64) -> ReceiptRef {
        ReceiptRef {
            id,
            filename: format!("recibo-{id}.pdf"),
            url: format!("/receipts/{id}"),
            size_bytes: 1024,
            uploaded_at: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        }
    }

    #[test]
    fn delete_staging_toggles_and_ignores_unknown_ids() {
        let mut staging = ReceiptStaging::with_existing(vec![receipt(1), receipt(2)]);
        assert!(staging.toggle_delete(1));
        assert!(staging.is_delete_staged(1));
        assert!(staging.toggle_delete(1));
        assert!(!staging.is_delete_staged(1));
        assert!(!staging.toggle_delete(99));
        assert!(!staging.has_work());
    }

    #[test]
    fn uploads_queue_with_filename() {
        let mut staging = ReceiptStaging::default();
        staging.queue_upload("/tmp/facturas/enero.pdf");
        assert_eq!(staging.pending()[0].filename, "enero.pdf");
        assert!(staging.has_work());
    }
}
