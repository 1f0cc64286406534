use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::UserId,
};

/// Persisted roster of every Steam ID the service has ever been asked about
///
/// The peer group for any recommendation is "everyone on the roster except
/// the requester", so the roster grows append-only: ids are added the first
/// time they show up and never pruned. Storage is a flat text file, one id
/// per line, rewritten wholesale on every change. The list is small, and the
/// whole-file contract keeps any swap-in store trivially compatible.
pub struct FileRoster {
    path: PathBuf,
    /// Serializes read-modify-write cycles so concurrent requests can't
    /// interleave a load and a rewrite
    write_lock: Mutex<()>,
}

impl FileRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the full roster in insertion order
    ///
    /// A missing file is an empty roster (nothing has been recorded yet);
    /// any other I/O failure is fatal for the current request.
    pub async fn load(&self) -> AppResult<Vec<UserId>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::RosterUnavailable(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut ids = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Lines were validated on the way in; a malformed line means the
            // file was edited by hand and the request can't trust the roster.
            let id = UserId::parse(line).map_err(|_| {
                AppError::RosterUnavailable(format!(
                    "malformed id {:?} in {}",
                    line,
                    self.path.display()
                ))
            })?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    /// Rewrites the whole roster file
    pub async fn save(&self, ids: &[UserId]) -> AppResult<()> {
        let mut contents = String::new();
        for id in ids {
            contents.push_str(id.as_str());
            contents.push('\n');
        }

        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            AppError::RosterUnavailable(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Membership check against the persisted roster
    pub async fn contains(&self, id: &UserId) -> AppResult<bool> {
        Ok(self.load().await?.contains(id))
    }

    /// Appends the id and persists the roster if it wasn't already present
    ///
    /// Idempotent. Returns whether the id was new.
    pub async fn add_if_absent(&self, id: &UserId) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;

        let mut ids = self.load().await?;
        if ids.contains(id) {
            return Ok(false);
        }

        ids.push(id.clone());
        self.save(&ids).await?;

        tracing::info!(user_id = %id, roster_size = ids.len(), "New user added to roster");

        Ok(true)
    }
}
