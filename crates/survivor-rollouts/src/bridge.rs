//! Connects rollout selection to the playback controller.
//!
//! Selecting a rollout is the one asynchronous step in the viewer: the log
//! has to be fetched before it can be played. While a fetch is in flight
//! the user may pick another rollout, or none. Every call to
//! [`SelectionBridge::select_rollout`] therefore takes a new generation
//! number, and a fetch only applies its result if its generation is still
//! the latest when it completes. The fetch itself is not cancelled; its
//! result is simply discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use survivor_core::playback::PlaybackController;
use tracing::{debug, info, warn};

use crate::error::BridgeError;
use crate::repository::RolloutRepository;

/// What a selection call ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// No rollout selected; playback is idle.
    Cleared,
    /// The rollout was fetched and loaded.
    Loaded {
        /// Rollout now loaded.
        identifier: String,
        /// Number of events in it.
        total: usize,
    },
    /// A newer selection was made while this one was fetching.
    Superseded,
}

/// The rollout most recently loaded through the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentSelection {
    /// Rollout identifier.
    pub identifier: String,
    /// Number of events.
    pub total: usize,
    /// When the log was handed to the controller.
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SelectionState {
    generation: u64,
    current: Option<CurrentSelection>,
}

/// Loads selected rollouts into a playback controller.
#[derive(Debug)]
pub struct SelectionBridge {
    repository: Arc<RolloutRepository>,
    controller: Arc<PlaybackController>,
    state: Mutex<SelectionState>,
}

impl SelectionBridge {
    /// Bridge `repository` to `controller`.
    pub fn new(repository: Arc<RolloutRepository>, controller: Arc<PlaybackController>) -> Self {
        Self {
            repository,
            controller,
            state: Mutex::new(SelectionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select a rollout by identifier, or clear the selection.
    ///
    /// `None`, an empty string, or whitespace clears playback. Otherwise the
    /// rollout is fetched and loaded, unless another selection was made in
    /// the meantime.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Fetch`] when the rollout cannot be fetched.
    /// The controller is left exactly as it was.
    pub async fn select_rollout(
        &self,
        identifier: Option<&str>,
    ) -> Result<SelectionOutcome, BridgeError> {
        let identifier = identifier.map(str::trim).filter(|id| !id.is_empty());

        let Some(identifier) = identifier else {
            let mut state = self.lock();
            state.generation = state.generation.wrapping_add(1);
            self.controller.unload();
            state.current = None;
            info!("rollout selection cleared");
            return Ok(SelectionOutcome::Cleared);
        };

        let generation = {
            let mut state = self.lock();
            state.generation = state.generation.wrapping_add(1);
            state.generation
        };

        debug!(identifier, generation, "fetching rollout");
        let fetched = self.repository.fetch(identifier).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(identifier, generation, "discarding superseded rollout fetch");
            return Ok(SelectionOutcome::Superseded);
        }
        match fetched {
            Ok(log) => {
                let total = log.len();
                self.controller.load(log);
                state.current = Some(CurrentSelection {
                    identifier: identifier.to_owned(),
                    total,
                    loaded_at: Utc::now(),
                });
                info!(identifier, total, "rollout loaded");
                Ok(SelectionOutcome::Loaded {
                    identifier: identifier.to_owned(),
                    total,
                })
            }
            Err(source) => {
                warn!(identifier, error = %source, "failed to fetch rollout");
                Err(BridgeError::Fetch {
                    identifier: identifier.to_owned(),
                    source,
                })
            }
        }
    }

    /// Rollout identifiers, or an empty list when the repository cannot
    /// be reached.
    pub async fn available_rollouts(&self) -> Vec<String> {
        match self.repository.list().await {
            Ok(identifiers) => identifiers,
            Err(e) => {
                warn!(repository = self.repository.name(), error = %e, "failed to list rollouts");
                Vec::new()
            }
        }
    }

    /// The last rollout applied to the controller, if any.
    pub fn current_selection(&self) -> Option<CurrentSelection> {
        self.lock().current.clone()
    }

    /// The repository selections are fetched from.
    pub fn repository(&self) -> &Arc<RolloutRepository> {
        &self.repository
    }

    /// The controller selections are loaded into.
    pub fn controller(&self) -> &Arc<PlaybackController> {
        &self.controller
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use survivor_core::config::PlaybackConfig;
    use survivor_types::{EventLog, PlaybackStatus};

    use super::*;
    use crate::memory::MemoryRepository;

    fn log_of(len: u64) -> EventLog {
        let events = (0..len)
            .map(|seq| {
                survivor_types::Event::new(
                    seq,
                    survivor_types::EventKind::Unknown {
                        event_type: String::from("TICK"),
                        params: serde_json::Value::Null,
                    },
                )
            })
            .collect();
        EventLog::new(events).unwrap()
    }

    fn bridge(repo: MemoryRepository) -> SelectionBridge {
        let controller = PlaybackController::new(&PlaybackConfig::default()).unwrap();
        SelectionBridge::new(Arc::new(repo.into()), Arc::new(controller))
    }

    #[tokio::test]
    async fn blank_identifiers_clear() {
        let bridge = bridge(MemoryRepository::new().with_rollout("g", log_of(2)));
        bridge.select_rollout(Some("g")).await.unwrap();
        for blank in [None, Some(""), Some("   ")] {
            bridge.select_rollout(Some("g")).await.unwrap();
            let outcome = bridge.select_rollout(blank).await.unwrap();
            assert_eq!(outcome, SelectionOutcome::Cleared);
            assert_eq!(bridge.controller().status(), PlaybackStatus::Idle);
            assert!(bridge.current_selection().is_none());
        }
    }

    #[tokio::test]
    async fn identifier_is_trimmed() {
        let bridge = bridge(MemoryRepository::new().with_rollout("g", log_of(2)));
        let outcome = bridge.select_rollout(Some("  g ")).await.unwrap();
        assert_eq!(
            outcome,
            SelectionOutcome::Loaded {
                identifier: String::from("g"),
                total: 2
            }
        );
    }

    #[tokio::test]
    async fn current_selection_records_load() {
        let bridge = bridge(MemoryRepository::new().with_rollout("g", log_of(3)));
        let before = Utc::now();
        bridge.select_rollout(Some("g")).await.unwrap();
        let current = bridge.current_selection().unwrap();
        assert_eq!(current.identifier, "g");
        assert_eq!(current.total, 3);
        assert!(current.loaded_at >= before);
    }
}
