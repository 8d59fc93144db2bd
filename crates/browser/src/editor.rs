//! Content operations against the open composer.
//!
//! Every mutation follows the same protocol: locate the element, wait until
//! it is interactable, act, then save. Saving is commit rather than
//! validation: by the time the save control is clicked the content is
//! already typed into the live document, so a failed save is logged and
//! swallowed instead of failing the operation.

use std::{fmt, time::Duration};

use {chromiumoxide::Page, tracing::warn};

use postwright_config::EditorConfig;

use crate::{dom::DomScope, error::EditorError};

/// Whether a matched target is substituted or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Replace,
    Remove,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Replace the first occurrence of `target` in `text`, or `None` when the
/// target does not occur. Removal is substitution with the empty string.
/// Left-to-right, case-sensitive, exact substring match; later occurrences
/// are left untouched.
pub fn substitute_first(text: &str, target: &str, replacement: &str) -> Option<String> {
    if target.is_empty() || !text.contains(target) {
        return None;
    }
    Some(text.replacen(target, replacement, 1))
}

/// Editing operations scoped to the editor frame of an open composer.
pub(crate) struct DocumentEditor<'a> {
    frame: DomScope<'a>,
    cfg: &'a EditorConfig,
    wait: Duration,
}

impl<'a> DocumentEditor<'a> {
    pub(crate) fn new(page: &'a Page, cfg: &'a EditorConfig) -> Self {
        let poll = Duration::from_millis(cfg.poll_interval_ms);
        Self {
            frame: DomScope::framed(page, &cfg.locators.editor_frame, poll),
            cfg,
            wait: Duration::from_millis(cfg.wait_timeout_ms),
        }
    }

    /// Wait until `selector` is interactable, erroring out on the budget.
    async fn require_clickable(&self, selector: &str) -> Result<(), EditorError> {
        if !self.frame.wait_clickable(selector, self.wait).await? {
            return Err(EditorError::ElementNotInteractable(
                selector.to_string(),
                self.cfg.wait_timeout_ms,
            ));
        }
        Ok(())
    }

    /// Write a fresh post: title, body, save.
    pub(crate) async fn create(&self, title: &str, body: &str) -> Result<(), EditorError> {
        let loc = &self.cfg.locators;

        self.require_clickable(&loc.title_section).await?;
        self.frame.click(&loc.title_section).await?;
        self.frame.insert_text(title).await?;

        self.require_clickable(&loc.body_section).await?;
        self.frame.click(&loc.body_section).await?;
        self.frame.type_lines(body).await?;

        self.commit().await;
        Ok(())
    }

    /// Current rendered body text, the authoritative snapshot for
    /// search-based edits. Requires presence only, not interactability.
    pub(crate) async fn read_snapshot(&self) -> Result<String, EditorError> {
        let loc = &self.cfg.locators;
        if !self.frame.wait_present(&loc.body_section, self.wait).await? {
            return Err(EditorError::Snapshot(format!(
                "body section {} not found",
                loc.body_section
            )));
        }
        Ok(self
            .frame
            .inner_text(&loc.body_section)
            .await?
            .unwrap_or_default())
    }

    /// Append `replacement` as a new line at the end of the body.
    pub(crate) async fn append(&self, replacement: &str) -> Result<(), EditorError> {
        let loc = &self.cfg.locators;

        self.require_clickable(&loc.body_section).await?;
        self.frame.click(&loc.body_section).await?;
        self.frame.caret_to_end(&loc.body_section).await?;
        self.frame.press_enter().await?;
        self.frame.type_lines(replacement).await?;

        self.commit().await;
        Ok(())
    }

    /// Replace or remove the first occurrence of `target` in the body.
    ///
    /// Reads the live snapshot first; when the target is absent the
    /// operation fails without touching the document. The new text is
    /// applied as a full-body rewrite (select all, retype) because the
    /// surface offers no partial-replace primitive.
    pub(crate) async fn replace_or_remove(
        &self,
        target: &str,
        replacement: &str,
        mode: EditMode,
    ) -> Result<(), EditorError> {
        let loc = &self.cfg.locators;

        let current = self.read_snapshot().await?;
        let substituted = match mode {
            EditMode::Replace => replacement,
            EditMode::Remove => "",
        };
        let Some(new_text) = substitute_first(&current, target, substituted) else {
            return Err(EditorError::TargetNotFound);
        };

        self.require_clickable(&loc.body_section).await?;
        self.frame.click(&loc.body_section).await?;
        self.frame.select_all(&loc.body_section).await?;
        if new_text.is_empty() {
            // Typing inserts nothing for an empty rewrite, which would leave
            // the selection (and the old body) in place. Erase it instead.
            self.frame.press_delete().await?;
        } else {
            self.frame.type_lines(&new_text).await?;
        }

        self.commit().await;
        Ok(())
    }

    /// Save, logging and swallowing failure. The mutation has already landed
    /// in the live document; only persistence of the draft is at stake.
    async fn commit(&self) {
        if let Err(e) = self.save().await {
            warn!(error = %e, "draft save failed; content is in the editor but not persisted");
        }
    }

    async fn save(&self) -> Result<(), EditorError> {
        let loc = &self.cfg.locators;
        self.require_clickable(&loc.save_button).await?;
        if let Err(e) = self.frame.click(&loc.save_button).await {
            // Coordinate click intercepted by an overlay; invoke the control
            // programmatically instead.
            warn!(error = %e, "save click blocked, retrying programmatically");
            self.frame
                .click_js(&loc.save_button)
                .await
                .map_err(|e| EditorError::SaveFailed(e.to_string()))?;
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_replaces_at_original_position() {
        assert_eq!(
            substitute_first("Hello World", "Hello", "Hi").unwrap(),
            "Hi World"
        );
    }

    #[test]
    fn substitute_with_empty_replacement_removes() {
        assert_eq!(
            substitute_first("Hello World Bye", "World ", "").unwrap(),
            "Hello Bye"
        );
    }

    #[test]
    fn substitute_only_touches_first_occurrence() {
        assert_eq!(
            substitute_first("one two one two", "two", "2").unwrap(),
            "one 2 one two"
        );
    }

    #[test]
    fn substitute_is_case_sensitive() {
        assert!(substitute_first("Hello", "hello", "x").is_none());
    }

    #[test]
    fn absent_target_yields_none() {
        assert!(substitute_first("Hello World", "Zzz", "X").is_none());
    }

    #[test]
    fn empty_target_yields_none() {
        assert!(substitute_first("Hello", "", "X").is_none());
    }

    #[test]
    fn removing_entire_body_yields_empty_rewrite() {
        // The rewrite can legitimately be empty; it must still be applied,
        // which is why replace_or_remove erases the selection rather than
        // typing nothing.
        assert_eq!(
            substitute_first("Hello World", "Hello World", ""),
            Some(String::new())
        );
    }

    #[test]
    fn substitution_spans_line_breaks() {
        assert_eq!(
            substitute_first("a\nb\nc", "b\nc", "d").unwrap(),
            "a\nd"
        );
    }

    #[test]
    fn edit_mode_display() {
        assert_eq!(EditMode::Replace.to_string(), "replace");
        assert_eq!(EditMode::Remove.to_string(), "remove");
    }
}
