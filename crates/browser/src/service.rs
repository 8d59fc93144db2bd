//! The editing service: one session, one operation in flight.

use std::time::Duration;

use {tokio::sync::Mutex, tracing::info};

use postwright_config::{Credentials, EditorConfig};

use crate::{
    dom::DomScope,
    editor::{DocumentEditor, EditMode},
    error::EditorError,
    gate, session,
    session::SessionSlot,
};

/// Front door for all content operations.
///
/// Owns the single session slot behind a mutex that is held for a whole
/// operation (ensure session → open editor → act), so concurrent requests
/// are serialized rather than interleaving keystrokes on the shared browser.
/// The first request to arrive also performs session init under the lock,
/// which rules out double-initialization.
pub struct EditorService {
    cfg: EditorConfig,
    credentials: Credentials,
    slot: Mutex<SessionSlot>,
}

impl EditorService {
    pub fn new(cfg: EditorConfig, credentials: Credentials) -> Self {
        Self {
            cfg,
            credentials,
            slot: Mutex::new(SessionSlot::Uninitialized),
        }
    }

    /// Write a new post with the given title and body.
    pub async fn create(&self, title: &str, body: &str) -> Result<(), EditorError> {
        let mut slot = self.slot.lock().await;
        let handle = session::ensure(&mut slot, &self.cfg, &self.credentials).await?;
        gate::open_editor(handle, &self.cfg).await?;

        DocumentEditor::new(&handle.page, &self.cfg)
            .create(title, body)
            .await?;
        info!(session_id = %handle.id, title, "created post");
        Ok(())
    }

    /// Append `replacement` as a new line at the end of the body.
    pub async fn append(&self, replacement: &str) -> Result<(), EditorError> {
        let mut slot = self.slot.lock().await;
        let handle = session::ensure(&mut slot, &self.cfg, &self.credentials).await?;
        gate::open_editor(handle, &self.cfg).await?;

        DocumentEditor::new(&handle.page, &self.cfg)
            .append(replacement)
            .await?;
        info!(session_id = %handle.id, chars = replacement.len(), "appended content");
        Ok(())
    }

    /// Replace the first occurrence of `target` with `replacement`.
    pub async fn replace(&self, target: &str, replacement: &str) -> Result<(), EditorError> {
        self.rewrite(target, replacement, EditMode::Replace).await
    }

    /// Remove the first occurrence of `target`.
    pub async fn remove(&self, target: &str) -> Result<(), EditorError> {
        self.rewrite(target, "", EditMode::Remove).await
    }

    async fn rewrite(
        &self,
        target: &str,
        replacement: &str,
        mode: EditMode,
    ) -> Result<(), EditorError> {
        // Rejected before any UI interaction is attempted.
        if target.is_empty() {
            return Err(EditorError::Validation("target is empty".into()));
        }

        let mut slot = self.slot.lock().await;
        let handle = session::ensure(&mut slot, &self.cfg, &self.credentials).await?;
        gate::open_editor(handle, &self.cfg).await?;

        DocumentEditor::new(&handle.page, &self.cfg)
            .replace_or_remove(target, replacement, mode)
            .await?;
        info!(session_id = %handle.id, %mode, target, "rewrote body");
        Ok(())
    }

    /// The current body text as rendered in the live editor.
    ///
    /// A read never brings the session up: with no session there is no
    /// document to read, and logging in just to return an empty composer
    /// would be misleading.
    pub async fn current_body(&self) -> Result<String, EditorError> {
        let mut slot = self.slot.lock().await;
        if matches!(*slot, SessionSlot::Uninitialized) {
            return Err(EditorError::Validation(
                "session not initialized; create or edit a post first".into(),
            ));
        }
        let handle = session::ensure(&mut slot, &self.cfg, &self.credentials).await?;

        // Reads never navigate: reloading the composer, or cancelling its
        // resume-draft prompt, could destroy the very body being read. The
        // frame scope re-resolves the editor document on every query, so it
        // is enough to confirm the frame is still there.
        let poll = Duration::from_millis(self.cfg.poll_interval_ms);
        let frame_sel = &self.cfg.locators.editor_frame;
        if !DomScope::top(&handle.page, poll).exists(frame_sel).await? {
            return Err(EditorError::Snapshot(format!(
                "editor frame {frame_sel} is not open"
            )));
        }

        DocumentEditor::new(&handle.page, &self.cfg)
            .read_snapshot()
            .await
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {postwright_config::Credentials, secrecy::Secret};

    use super::*;

    fn service() -> EditorService {
        let credentials = Credentials {
            id: "writer".into(),
            password: Secret::new("pw".into()),
        };
        EditorService::new(EditorConfig::default(), credentials)
    }

    // A read must neither start a session nor navigate anywhere; with no
    // session it is rejected outright.
    #[tokio::test]
    async fn read_without_session_is_rejected() {
        let err = service().current_body().await.unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
    }

    #[tokio::test]
    async fn rewrite_with_empty_target_is_rejected_before_any_session_work() {
        let err = service().remove("").await.unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
    }
}
