use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::services::session::SessionManager;
use crate::utils::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ResetOutcome {
    pub status: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResetAllOutcome {
    pub deleted_count: usize,
    pub user_id: String,
}

/// Clears session state from both storage tiers for a fresh simulation.
pub struct ResetService {
    sessions: Arc<SessionManager>,
}

impl ResetService {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    pub async fn reset_session(&self, session_id: &str) -> Result<ResetOutcome, ApiError> {
        let deleted = self.sessions.delete_session(session_id).await?;

        let status = if deleted {
            info!(session_id, "Session reset");
            "reset"
        } else {
            warn!(session_id, "Session not found for reset");
            "not_found"
        };

        Ok(ResetOutcome {
            status: status.to_string(),
            session_id: session_id.to_string(),
        })
    }

    pub async fn reset_all_user_sessions(&self, user_id: &str) -> Result<ResetAllOutcome, ApiError> {
        let sessions = self.sessions.list_user_sessions(user_id).await?;

        let mut deleted_count = 0;
        for summary in sessions {
            if self.sessions.delete_session(&summary.id).await? {
                deleted_count += 1;
            }
        }

        info!(user_id, deleted_count, "All user sessions reset");
        Ok(ResetAllOutcome {
            deleted_count,
            user_id: user_id.to_string(),
        })
    }
}
