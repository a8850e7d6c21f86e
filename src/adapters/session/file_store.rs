//! File Session Store - Implementation of SessionStore on the local
//! filesystem.
//!
//! Each session owns a directory named by its id, holding three JSON
//! artifacts:
//!
//! ```text
//! {base_dir}/
//! └── 550e8400-e29b-41d4-a716-446655440000/
//!     ├── record.json        flat map of set case-record fields
//!     ├── conversation.json  id, timestamps, model, ordered message log
//!     └── references.json    {id, title, score} list, after transition only
//! ```
//!
//! # Atomic Writes
//!
//! Every artifact is written with a write-to-temp-then-rename pattern:
//! write `*.json.tmp`, sync to disk, rename over the final path. A crash
//! mid-write leaves the prior version readable. The conversation record is
//! written last, so a partially saved turn is never observed with a
//! conversation log ahead of its record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::conversation::MessageRecord;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::record::CaseRecord;
use crate::domain::session::{MentorSession, ReferenceMetadata};
use crate::ports::{SessionStore, SessionStoreError};

const RECORD_FILE: &str = "record.json";
const CONVERSATION_FILE: &str = "conversation.json";
const REFERENCES_FILE: &str = "references.json";

/// Local filesystem store for session aggregates.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    /// Base directory for all session directories.
    base_dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at the given directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn session_dir(&self, id: SessionId) -> PathBuf {
        self.base_dir.join(id.to_string())
    }

    async fn write_atomic(path: &Path, content: &str) -> Result<(), SessionStoreError> {
        let tmp_path = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_path).await.map_err(|e| {
            SessionStoreError::Io(format!(
                "Failed to create temp file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        file.write_all(content.as_bytes()).await.map_err(|e| {
            SessionStoreError::Io(format!(
                "Failed to write temp file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            SessionStoreError::Io(format!(
                "Failed to sync temp file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        fs::rename(&tmp_path, path).await.map_err(|e| {
            SessionStoreError::Io(format!(
                "Failed to rename {} to {}: {}",
                tmp_path.display(),
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<T, SessionStoreError> {
        let bytes = fs::read(path).await.map_err(|e| {
            SessionStoreError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            SessionStoreError::Corrupt(format!("{}: {}", path.display(), e))
        })
    }

    fn to_json<T: Serialize>(value: &T) -> Result<String, SessionStoreError> {
        serde_json::to_string_pretty(value)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: SessionId) -> Result<MentorSession, SessionStoreError> {
        let dir = self.session_dir(id);
        let conversation_path = dir.join(CONVERSATION_FILE);

        // No conversation record means nothing was ever persisted for this
        // id: hand back a fresh, seeded session.
        match fs::try_exists(&conversation_path).await {
            Ok(true) => {}
            Ok(false) => return Ok(MentorSession::new(id)),
            Err(e) => {
                return Err(SessionStoreError::Io(format!(
                    "Failed to stat {}: {}",
                    conversation_path.display(),
                    e
                )))
            }
        }

        let conversation: ConversationFile = Self::read_json(&conversation_path).await?;

        let record_path = dir.join(RECORD_FILE);
        let record: CaseRecord = match fs::try_exists(&record_path).await {
            Ok(true) => Self::read_json(&record_path).await?,
            _ => CaseRecord::new(),
        };

        let references_path = dir.join(REFERENCES_FILE);
        let references: Vec<ReferenceMetadata> = match fs::try_exists(&references_path).await {
            Ok(true) => Self::read_json(&references_path).await?,
            _ => Vec::new(),
        };

        Ok(MentorSession::reconstitute(
            id,
            conversation.created_at,
            conversation.model,
            record,
            conversation.messages,
            conversation.phase_transition_at,
            references,
        ))
    }

    async fn save(&self, session: &MentorSession) -> Result<(), SessionStoreError> {
        let dir = self.session_dir(session.id());
        fs::create_dir_all(&dir).await.map_err(|e| {
            SessionStoreError::Io(format!(
                "Failed to create session directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let record_json = Self::to_json(session.record())?;
        Self::write_atomic(&dir.join(RECORD_FILE), &record_json).await?;

        if !session.references().is_empty() {
            let references_json = Self::to_json(&session.references())?;
            Self::write_atomic(&dir.join(REFERENCES_FILE), &references_json).await?;
        }

        let conversation = ConversationFile {
            session_id: session.id(),
            created_at: *session.created_at(),
            phase_transition_at: session.phase_transition_at().copied(),
            model: session.model_id().map(str::to_string),
            messages: session.messages().to_vec(),
        };
        let conversation_json = Self::to_json(&conversation)?;
        Self::write_atomic(&dir.join(CONVERSATION_FILE), &conversation_json).await?;

        Ok(())
    }
}

/// Durable shape of the conversation artifact.
#[derive(Debug, Serialize, Deserialize)]
struct ConversationFile {
    session_id: SessionId,
    created_at: Timestamp,
    phase_transition_at: Option<Timestamp>,
    model: Option<String>,
    messages: Vec<MessageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Phase;
    use crate::domain::record::FieldName;
    use crate::domain::session::RetrievedReference;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileSessionStore) {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        (dir, store)
    }

    fn populated_session() -> MentorSession {
        let mut session = MentorSession::new(SessionId::new());
        session.push_user("The patient is seven.").unwrap();
        session.push_assistant("What is the diagnosis?").unwrap();
        session.set_field("patient_age", "7").unwrap();
        session.set_field("diagnosis", "DCD").unwrap();
        session.set_model_id("gemini-2.0-flash-exp");
        session
    }

    #[tokio::test]
    async fn save_then_load_round_trips_the_aggregate() {
        let (_dir, store) = store();
        let session = populated_session();

        store.save(&session).await.unwrap();
        let loaded = store.load(session.id()).await.unwrap();

        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn load_of_fresh_id_yields_seeded_session() {
        let (_dir, store) = store();
        let id = SessionId::new();

        let session = store.load(id).await.unwrap();

        assert_eq!(session.id(), id);
        assert_eq!(session.phase(), Phase::Intake);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.record().filled_count(), 0);
    }

    #[tokio::test]
    async fn repeated_load_is_side_effect_free() {
        let (_dir, store) = store();
        let session = populated_session();
        store.save(&session).await.unwrap();

        let first = store.load(session.id()).await.unwrap();
        let second = store.load(session.id()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn transitioned_session_round_trips_references() {
        let (_dir, store) = store();
        let mut session = populated_session();
        session
            .apply_transition(&[RetrievedReference {
                id: "case-1".to_string(),
                title: "School refusal".to_string(),
                content: "Full text".to_string(),
                score: 0.11,
            }])
            .unwrap();

        store.save(&session).await.unwrap();
        let loaded = store.load(session.id()).await.unwrap();

        assert_eq!(loaded.phase(), Phase::Mentoring);
        assert_eq!(loaded.phase_transition_at(), session.phase_transition_at());
        assert_eq!(loaded.references().len(), 1);
        assert_eq!(loaded.references()[0].id, "case-1");
    }

    #[tokio::test]
    async fn record_file_holds_flat_map_of_set_fields() {
        let (dir, store) = store();
        let session = populated_session();
        store.save(&session).await.unwrap();

        let path = dir
            .path()
            .join(session.id().to_string())
            .join("record.json");
        let raw = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["patient_age"], "7");
        assert_eq!(value["diagnosis"], "DCD");
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn references_file_absent_before_transition() {
        let (dir, store) = store();
        let session = populated_session();
        store.save(&session).await.unwrap();

        let path = dir
            .path()
            .join(session.id().to_string())
            .join("references.json");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn no_temp_files_remain_after_save() {
        let (dir, store) = store();
        let session = populated_session();
        store.save(&session).await.unwrap();

        let session_dir = dir.path().join(session.id().to_string());
        let leftovers: Vec<_> = std::fs::read_dir(&session_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn corrupt_conversation_file_is_an_error() {
        let (dir, store) = store();
        let id = SessionId::new();
        let session_dir = dir.path().join(id.to_string());
        std::fs::create_dir_all(&session_dir).unwrap();
        std::fs::write(session_dir.join("conversation.json"), "{not json").unwrap();

        let result = store.load(id).await;
        assert!(matches!(result, Err(SessionStoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn save_overwrites_prior_version() {
        let (_dir, store) = store();
        let mut session = populated_session();
        store.save(&session).await.unwrap();

        session.push_user("More details.").unwrap();
        session.set_field("cultural_background", "immigrant family").unwrap();
        store.save(&session).await.unwrap();

        let loaded = store.load(session.id()).await.unwrap();
        assert_eq!(loaded.messages().len(), 5);
        assert_eq!(loaded.record().get(FieldName::CulturalBackground), Some("immigrant family"));
    }

    #[tokio::test]
    async fn distinct_sessions_are_isolated() {
        let (_dir, store) = store();
        let first = populated_session();
        let second = MentorSession::new(SessionId::new());

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(
            store.load(first.id()).await.unwrap().record().filled_count(),
            2
        );
        assert_eq!(
            store.load(second.id()).await.unwrap().record().filled_count(),
            0
        );
    }
}
