//! Budget sessions
//!
//! Every session owns one `ExpenseStore`. Sessions are kept in memory and
//! dropped after 30 minutes of inactivity; expired ids behave like unknown ids.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use penny_core::{Confirmation, Expense, ExpenseStore, ValidationError};

use crate::{AppError, AppState};

/// Session timeout (30 minutes of inactivity)
const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A budget session
#[derive(Debug, Clone)]
pub struct Session {
    pub created_at: Instant,
    pub last_activity: Instant,
    pub store: ExpenseStore,
}

impl Session {
    fn new(store: ExpenseStore) -> Self {
        Self {
            created_at: Instant::now(),
            last_activity: Instant::now(),
            store,
        }
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn info(&self, session_id: &str) -> SessionInfo {
        SessionInfo {
            session_id: session_id.to_string(),
            expense_count: self.store.len(),
            created_at_secs_ago: self.created_at.elapsed().as_secs(),
            last_activity_secs_ago: self.last_activity.elapsed().as_secs(),
        }
    }
}

/// In-memory session manager
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
    counter: AtomicU64,
    timeout: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_timeout(SESSION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            counter: AtomicU64::new(0),
            timeout,
        }
    }

    /// Create a new session and return its ID
    pub async fn create_session(&self, currency_symbol: &str) -> String {
        // Unique ID from timestamp + counter
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_le_bytes());
        hasher.update(count.to_le_bytes());
        let session_id = format!("ses_{}", &hex::encode(hasher.finalize())[..16]);

        let mut sessions = self.sessions.write().await;

        // Clean up expired sessions while we're here
        let timeout = self.timeout;
        sessions.retain(|_, s| !s.is_expired(timeout));

        sessions.insert(
            session_id.clone(),
            Session::new(ExpenseStore::with_currency(currency_symbol)),
        );
        session_id
    }

    /// Get session info (None if not found or expired)
    pub async fn get_session_info(&self, session_id: &str) -> Option<SessionInfo> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|s| !s.is_expired(self.timeout))
            .map(|s| s.info(session_id))
    }

    /// Delete a session
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    /// Append an expense to a session's store
    ///
    /// Outer None: unknown session. Inner result: the store's validation outcome.
    pub async fn add_expense(
        &self,
        session_id: &str,
        amount: &str,
        category: &str,
        description: Option<&str>,
    ) -> Option<Result<Confirmation, ValidationError>> {
        let mut sessions = self.sessions.write().await;
        let session = self.live_session(&mut sessions, session_id)?;
        session.touch();
        Some(session.store.append(amount, category, description))
    }

    /// Owned copy of a session's expenses
    ///
    /// Callers may await on collaborators afterwards without holding the lock.
    pub async fn snapshot(&self, session_id: &str) -> Option<Vec<Expense>> {
        let mut sessions = self.sessions.write().await;
        let session = self.live_session(&mut sessions, session_id)?;
        session.touch();
        Some(session.store.snapshot())
    }

    /// Number of sessions that have not expired
    pub async fn len(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !s.is_expired(self.timeout))
            .count()
    }

    /// Look up a session for writing, evicting it if it has expired
    fn live_session<'a>(
        &self,
        sessions: &'a mut HashMap<String, Session>,
        session_id: &str,
    ) -> Option<&'a mut Session> {
        if sessions.get(session_id)?.is_expired(self.timeout) {
            sessions.remove(session_id);
            debug!(session_id, "Evicted expired session");
            return None;
        }
        sessions.get_mut(session_id)
    }
}

/// Session info response
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub expense_count: usize,
    pub created_at_secs_ago: u64,
    pub last_activity_secs_ago: u64,
}

pub(crate) fn session_not_found() -> AppError {
    AppError::not_found("Session not found or expired")
}

/// POST /api/sessions - Create a new budget session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionInfo>, AppError> {
    let session_id = state
        .sessions
        .create_session(&state.config.display.currency_symbol)
        .await;

    debug!(session_id = %session_id, "Created budget session");

    Ok(Json(SessionInfo {
        session_id,
        expense_count: 0,
        created_at_secs_ago: 0,
        last_activity_secs_ago: 0,
    }))
}

/// GET /api/sessions/:id - Get session info
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, AppError> {
    let info = state
        .sessions
        .get_session_info(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(info))
}

/// DELETE /api/sessions/:id - End a session and discard its expenses
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.sessions.delete_session(&session_id).await;

    debug!(session_id = %session_id, deleted = deleted, "Deleted budget session");

    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
