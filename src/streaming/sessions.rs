//! In-memory registry of live stream sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use super::plan::ChunkPlan;

/// Lifecycle of one streamed chunk.
///
/// Transitions are one-way: `HeaderSent -> Streaming -> Completed | Aborted`.
/// A session that never produces a byte can also go straight from
/// `HeaderSent` to `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Response headers committed, no body bytes sent yet.
    HeaderSent,
    /// At least one body byte has been forwarded.
    Streaming,
    /// The planned chunk was delivered in full.
    Completed,
    /// The client disconnected or the transform failed mid-stream.
    Aborted,
}

/// One in-flight (or just-finished) chunk delivery.
#[derive(Debug, Clone, Serialize)]
pub struct StreamSession {
    pub id: String,
    pub asset_id: Uuid,
    pub range_start: u64,
    pub range_end: u64,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
}

/// Concurrent session registry shared across request handlers.
///
/// Sessions are removed on finish; the map only ever holds live streams, so
/// listing it answers "who is watching right now".
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, StreamSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session in `HeaderSent` state and return its id.
    pub fn register(&self, asset_id: Uuid, plan: &ChunkPlan) -> String {
        let id = Uuid::new_v4().to_string();
        let session = StreamSession {
            id: id.clone(),
            asset_id,
            range_start: plan.start,
            range_end: plan.end,
            state: SessionState::HeaderSent,
            started_at: Utc::now(),
        };
        tracing::debug!(
            session_id = %id,
            %asset_id,
            start = plan.start,
            end = plan.end,
            "stream session opened"
        );
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Record that the first body byte went out.
    pub fn mark_streaming(&self, id: &str) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            if session.state == SessionState::HeaderSent {
                session.state = SessionState::Streaming;
            }
        }
    }

    /// Close a session and remove it from the registry.
    pub fn finish(&self, id: &str, completed: bool) {
        if let Some((_, session)) = self.sessions.remove(id) {
            let elapsed = Utc::now() - session.started_at;
            let state = if completed {
                SessionState::Completed
            } else {
                SessionState::Aborted
            };
            tracing::debug!(
                session_id = %id,
                asset_id = %session.asset_id,
                ?state,
                elapsed_ms = elapsed.num_milliseconds(),
                "stream session closed"
            );
        }
    }

    /// Snapshot of all live sessions.
    pub fn list_active(&self) -> Vec<StreamSession> {
        let mut sessions: Vec<_> = self.sessions.iter().map(|e| e.value().clone()).collect();
        sessions.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> ChunkPlan {
        ChunkPlan {
            start: 0,
            end: 1023,
            total_length: Some(4096),
        }
    }

    #[test]
    fn register_starts_in_header_sent() {
        let manager = SessionManager::new();
        let id = manager.register(Uuid::new_v4(), &plan());

        let sessions = manager.list_active();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert_eq!(sessions[0].state, SessionState::HeaderSent);
    }

    #[test]
    fn mark_streaming_advances_state_once() {
        let manager = SessionManager::new();
        let id = manager.register(Uuid::new_v4(), &plan());

        manager.mark_streaming(&id);
        assert_eq!(manager.list_active()[0].state, SessionState::Streaming);

        // Repeat calls are harmless.
        manager.mark_streaming(&id);
        assert_eq!(manager.list_active()[0].state, SessionState::Streaming);
    }

    #[test]
    fn finish_removes_the_session() {
        let manager = SessionManager::new();
        let id = manager.register(Uuid::new_v4(), &plan());
        assert_eq!(manager.len(), 1);

        manager.finish(&id, true);
        assert!(manager.is_empty());

        // Finishing an unknown id is a no-op.
        manager.finish("missing", false);
    }

    #[test]
    fn list_is_ordered_by_start_time() {
        let manager = SessionManager::new();
        let first = manager.register(Uuid::new_v4(), &plan());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = manager.register(Uuid::new_v4(), &plan());

        let sessions = manager.list_active();
        assert_eq!(sessions[0].id, first);
        assert_eq!(sessions[1].id, second);
    }
}
