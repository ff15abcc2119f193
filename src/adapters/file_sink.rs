//! File-backed submission sink.
//!
//! Writes each accepted submission as its own JSON document and keeps one
//! draft per form (and user) for save-and-continue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::FormValues;
use crate::engine::{HandlerError, SubmissionKind, ValuesHandler};

/// Document stored for every submission or draft
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredValues {
    pub form_id: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub stored_at: DateTime<Utc>,
    pub values: FormValues,
}

/// Handler persisting values under `<dir>/<form_id>/`
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    form_id: String,
    user_id: Option<String>,
    kind: SubmissionKind,
}

impl FileSink {
    /// Sink for the submit handler: one file per submission
    pub fn submissions(dir: impl Into<PathBuf>, form_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            form_id: form_id.into(),
            user_id: None,
            kind: SubmissionKind::Submit,
        }
    }

    /// Sink for the save handler: a single draft, overwritten on each save
    pub fn drafts(dir: impl Into<PathBuf>, form_id: impl Into<String>) -> Self {
        Self {
            kind: SubmissionKind::Save,
            ..Self::submissions(dir, form_id)
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    fn form_dir(&self) -> PathBuf {
        self.dir.join(sanitize(&self.form_id))
    }

    /// Path of the draft this sink writes
    pub fn draft_path(&self) -> PathBuf {
        draft_path(&self.dir, &self.form_id, self.user_id.as_deref())
    }

    fn target_path(&self, stored_at: DateTime<Utc>) -> PathBuf {
        match self.kind {
            SubmissionKind::Submit => self.form_dir().join(format!(
                "submission-{}.json",
                stored_at.format("%Y%m%dT%H%M%S%.3fZ")
            )),
            SubmissionKind::Save => self.draft_path(),
        }
    }
}

#[async_trait]
impl ValuesHandler for FileSink {
    async fn handle(&self, values: FormValues) -> Result<(), HandlerError> {
        let stored_at = Utc::now();
        let document = StoredValues {
            form_id: self.form_id.clone(),
            kind: match self.kind {
                SubmissionKind::Submit => "submission".to_string(),
                SubmissionKind::Save => "draft".to_string(),
            },
            user_id: self.user_id.clone(),
            stored_at,
            values,
        };

        let path = self.target_path(stored_at);
        tokio::fs::create_dir_all(self.form_dir()).await?;
        let content = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&path, content).await?;

        tracing::debug!("Stored {} for '{}' at {}", document.kind, self.form_id, path.display());
        Ok(())
    }
}

fn draft_path(dir: &Path, form_id: &str, user_id: Option<&str>) -> PathBuf {
    let name = match user_id {
        Some(user) => format!("draft-{}.json", sanitize(user)),
        None => "draft.json".to_string(),
    };
    dir.join(sanitize(form_id)).join(name)
}

/// Keep ids usable as path segments
fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') { c } else { '_' })
        .collect()
}

/// Values of a previously saved draft, if one exists
pub async fn load_draft(
    dir: &Path,
    form_id: &str,
    user_id: Option<&str>,
) -> Result<Option<FormValues>, anyhow::Error> {
    let path = draft_path(dir, form_id, user_id);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            let stored: StoredValues = serde_json::from_str(&content)?;
            Ok(Some(stored.values))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Delete a saved draft once its form has been submitted.
/// Returns whether a draft existed.
pub async fn remove_draft(
    dir: &Path,
    form_id: &str,
    user_id: Option<&str>,
) -> Result<bool, anyhow::Error> {
    let path = draft_path(dir, form_id, user_id);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::debug!("Removed draft of '{}' at {}", form_id, path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
