//! Rollouts stored as `{identifier}.json` files in one directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use survivor_types::EventLog;
use tracing::debug;

use crate::error::RepositoryError;

const EXTENSION: &str = "json";

/// Reads rollouts from a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    root: PathBuf,
}

impl DirectoryRepository {
    /// Serve rollouts from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory being served.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifiers of every `*.json` file, sorted.
    pub async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        let io_error = |source| RepositoryError::Io {
            path: self.root.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(io_error)?;
        let mut identifiers = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                identifiers.push(stem.to_owned());
            }
        }
        identifiers.sort();
        Ok(identifiers)
    }

    /// Read and decode one rollout.
    pub async fn fetch(&self, identifier: &str) -> Result<Arc<EventLog>, RepositoryError> {
        validate_identifier(identifier)?;
        let path = self.root.join(format!("{identifier}.{EXTENSION}"));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(identifier.to_owned()));
            }
            Err(source) => return Err(RepositoryError::Io { path, source }),
        };
        let log = EventLog::from_json_slice(&bytes).map_err(|source| {
            RepositoryError::Malformed {
                identifier: identifier.to_owned(),
                source,
            }
        })?;
        debug!(identifier, events = log.len(), path = %path.display(), "rollout read from disk");
        Ok(Arc::new(log))
    }
}

/// Reject identifiers that are empty or could name a path outside the
/// repository.
pub fn validate_identifier(identifier: &str) -> Result<(), RepositoryError> {
    let suspicious = identifier.is_empty()
        || identifier.starts_with('.')
        || identifier
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control());
    if suspicious {
        return Err(RepositoryError::InvalidIdentifier(identifier.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    /// A scratch directory under the system temp dir, removed on drop.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "survivor-rollouts-{name}-{}",
                std::process::id()
            ));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, file: &str, contents: &str) {
            std::fs::write(self.0.join(file), contents).unwrap();
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    const GAME: &str = r#"[
        {"seq_number": 0, "event_type": "ENTER_NORMAL_ROUND",
         "event_params": {"player_ids_in_round": [1, 2]}},
        {"seq_number": 1, "event_type": "WINNER",
         "event_params": {"winner_player_id": 2}}
    ]"#;

    #[tokio::test]
    async fn lists_json_files_sorted() {
        let scratch = Scratch::new("list");
        scratch.write("b_game.json", GAME);
        scratch.write("a_game.json", GAME);
        scratch.write("notes.txt", "not a rollout");
        let repo = DirectoryRepository::new(&scratch.0);
        assert_eq!(repo.list().await.unwrap(), vec!["a_game", "b_game"]);
    }

    #[tokio::test]
    async fn fetches_and_decodes() {
        let scratch = Scratch::new("fetch");
        scratch.write("game.json", GAME);
        let repo = DirectoryRepository::new(&scratch.0);
        let log = repo.fetch("game").await.unwrap();
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn missing_rollout_is_not_found() {
        let scratch = Scratch::new("missing");
        let repo = DirectoryRepository::new(&scratch.0);
        let err = repo.fetch("nope").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn malformed_rollout_is_reported() {
        let scratch = Scratch::new("malformed");
        scratch.write("broken.json", "[{\"seq_number\": ");
        let repo = DirectoryRepository::new(&scratch.0);
        let err = repo.fetch("broken").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Malformed { .. }));
    }

    #[tokio::test]
    async fn missing_directory_fails_listing() {
        let repo = DirectoryRepository::new("/nonexistent/survivor/rollouts");
        let err = repo.list().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Io { .. }));
    }

    #[tokio::test]
    async fn path_escapes_are_rejected() {
        let repo = DirectoryRepository::new(std::env::temp_dir());
        for bad in ["", "../etc/passwd", "a/b", "a\\b", ".hidden", "x?y"] {
            let err = repo.fetch(bad).await.unwrap_err();
            assert!(
                matches!(err, RepositoryError::InvalidIdentifier(_)),
                "{bad:?} was accepted"
            );
        }
    }
}
