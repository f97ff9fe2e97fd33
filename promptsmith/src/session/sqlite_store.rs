//! SQLite-backed session store. Sessions survive restarts of the process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::evaluation::EvaluationReport;
use crate::session::{SessionState, SessionStore, SessionStoreError};

/// One row per user in `sessions (user_id, last_draft, last_report)`; the report is stored as
/// JSON text.
pub struct SqliteSessionStore {
    db_path: PathBuf,
}

fn other<E: std::fmt::Display>(e: E) -> SessionStoreError {
    SessionStoreError::Other(e.to_string())
}

impl SqliteSessionStore {
    /// Opens (or creates) the database at `path` and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SessionStoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(other)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                user_id TEXT PRIMARY KEY,
                last_draft TEXT,
                last_report TEXT
            )
            "#,
            [],
        )
        .map_err(other)?;
        Ok(Self { db_path })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, user_id: &str) -> Result<SessionState, SessionStoreError> {
        let user_id = user_id.to_string();
        let db_path = self.db_path.clone();
        let row: Option<(Option<String>, Option<String>)> =
            tokio::task::spawn_blocking(move || {
                let conn = rusqlite::Connection::open(&db_path).map_err(other)?;
                conn.query_row(
                    "SELECT last_draft, last_report FROM sessions WHERE user_id = ?1",
                    params![user_id],
                    |row| {
                        Ok((
                            row.get::<_, Option<String>>(0)?,
                            row.get::<_, Option<String>>(1)?,
                        ))
                    },
                )
                .optional()
                .map_err(other)
            })
            .await
            .map_err(other)??;

        let Some((last_draft, last_report)) = row else {
            return Ok(SessionState::default());
        };
        let last_evaluation_report = match last_report {
            Some(js) => Some(serde_json::from_str::<EvaluationReport>(&js).map_err(other)?),
            None => None,
        };
        Ok(SessionState {
            last_draft_prompt: last_draft,
            last_evaluation_report,
        })
    }

    async fn put(&self, user_id: &str, state: SessionState) -> Result<(), SessionStoreError> {
        let report = state
            .last_evaluation_report
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(other)?;
        let user_id = user_id.to_string();
        let draft = state.last_draft_prompt;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(other)?;
            conn.execute(
                "INSERT INTO sessions (user_id, last_draft, last_report) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(user_id) DO UPDATE SET last_draft = excluded.last_draft, \
                 last_report = excluded.last_report",
                params![user_id, draft, report],
            )
            .map_err(other)?;
            Ok::<(), SessionStoreError>(())
        })
        .await
        .map_err(other)?
    }

    async fn remove(&self, user_id: &str) -> Result<(), SessionStoreError> {
        let user_id = user_id.to_string();
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(other)?;
            conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])
                .map_err(other)?;
            Ok::<(), SessionStoreError>(())
        })
        .await
        .map_err(other)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::CriterionRecord;
    use tempfile::NamedTempFile;

    fn sample_report() -> EvaluationReport {
        EvaluationReport::new(
            vec![
                CriterionRecord::new("2. Context", Some(3.0), "ok", "add audience").unwrap(),
                CriterionRecord::new("1. Clarity", None, "", "").unwrap(),
            ],
            Some(3.0),
        )
    }

    #[tokio::test]
    async fn put_then_get_round_trips_state() {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteSessionStore::new(file.path()).unwrap();
        let state = SessionState {
            last_draft_prompt: Some("draft".into()),
            last_evaluation_report: Some(sample_report()),
        };
        store.put("u1", state.clone()).await.unwrap();
        assert_eq!(store.get("u1").await.unwrap(), state);
    }

    #[tokio::test]
    async fn put_overwrites_previous_state() {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteSessionStore::new(file.path()).unwrap();
        store
            .put(
                "u1",
                SessionState {
                    last_draft_prompt: Some("old".into()),
                    last_evaluation_report: Some(sample_report()),
                },
            )
            .await
            .unwrap();
        store
            .put("u1", SessionState::with_draft("new"))
            .await
            .unwrap();
        let s = store.get("u1").await.unwrap();
        assert_eq!(s.last_draft_prompt.as_deref(), Some("new"));
        assert!(s.last_evaluation_report.is_none());
    }

    #[tokio::test]
    async fn unknown_and_removed_users_get_default() {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteSessionStore::new(file.path()).unwrap();
        assert_eq!(store.get("ghost").await.unwrap(), SessionState::default());
        store.put("u", SessionState::with_draft("d")).await.unwrap();
        store.remove("u").await.unwrap();
        assert_eq!(store.get("u").await.unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn sessions_survive_reopening_the_database() {
        let file = NamedTempFile::new().unwrap();
        SqliteSessionStore::new(file.path())
            .unwrap()
            .put("u", SessionState::with_draft("kept"))
            .await
            .unwrap();
        let reopened = SqliteSessionStore::new(file.path()).unwrap();
        assert_eq!(
            reopened.get("u").await.unwrap().last_draft_prompt.as_deref(),
            Some("kept")
        );
    }
}
