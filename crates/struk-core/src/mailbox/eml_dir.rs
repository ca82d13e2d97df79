//! A mailbox backed by a directory of `.eml` files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, warn};

use super::{CandidateId, MailboxPort, PortError, SearchView, header_fields};

/// Read-only mailbox over a directory of RFC 5322 message files.
///
/// The session is the directory listing taken at [`EmlDirectory::open`]:
/// ids are file names, searches return them in file-name order, and files
/// added later are not seen. A message without a parseable `Date` header
/// is dated by its file modification time.
#[derive(Debug, Clone)]
pub struct EmlDirectory {
    root: PathBuf,
    names: Vec<String>,
}

impl EmlDirectory {
    /// Opens a directory as a mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Connection`] if the directory cannot be listed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, PortError> {
        let root = root.as_ref().to_path_buf();
        let mut reader = tokio::fs::read_dir(&root)
            .await
            .map_err(|e| PortError::Connection(format!("{}: {e}", root.display())))?;

        let mut names = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| PortError::Connection(format!("{}: {e}", root.display())))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_eml = Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if is_eml && is_file {
                names.push(name);
            }
        }
        names.sort();

        debug!(root = %root.display(), messages = names.len(), "Opened eml directory");
        Ok(Self { root, names })
    }

    /// Number of messages in the session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when the directory held no `.eml` files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn path_of(&self, id: &CandidateId) -> Result<PathBuf, PortError> {
        // Only names from the listing resolve, so ids cannot escape the root.
        if self.names.binary_search_by(|n| n.as_str().cmp(id.as_str())).is_ok() {
            Ok(self.root.join(id.as_str()))
        } else {
            Err(PortError::NotFound(id.clone()))
        }
    }

    async fn read(&self, id: &CandidateId) -> Result<Vec<u8>, PortError> {
        let path = self.path_of(id)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| PortError::Operation(format!("{}: {e}", path.display())))
    }

    async fn modified_date(&self, name: &str) -> Option<NaiveDate> {
        let metadata = tokio::fs::metadata(self.root.join(name)).await.ok()?;
        let modified: DateTime<Local> = metadata.modified().ok()?.into();
        Some(modified.date_naive())
    }
}

impl MailboxPort for EmlDirectory {
    async fn search(
        &mut self,
        sender: &str,
        since: NaiveDate,
    ) -> Result<Vec<CandidateId>, PortError> {
        let mut found = Vec::new();

        for name in &self.names {
            let path = self.root.join(name);
            let raw = match tokio::fs::read(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable message");
                    continue;
                }
            };

            let view = SearchView::from_raw(&raw);
            let fallback = if view.date.is_none() {
                self.modified_date(name).await
            } else {
                None
            };
            if view.matches(sender, since, fallback) {
                found.push(CandidateId::new(name.clone()));
            }
        }

        Ok(found)
    }

    async fn fetch_header(
        &mut self,
        id: &CandidateId,
        fields: &[&str],
    ) -> Result<Vec<u8>, PortError> {
        let raw = self.read(id).await?;
        Ok(header_fields(&raw, fields))
    }

    async fn fetch_full(&mut self, id: &CandidateId) -> Result<Vec<u8>, PortError> {
        self.read(id).await
    }
}
