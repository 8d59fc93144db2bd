//! Readiness gate: navigation, frame switch, and overlay dismissal.
//!
//! The editor surface is asynchronous and overlay-laden. Before any content
//! operation is safe, the gate navigates to the composer, waits for the
//! embedded editor frame, and clears the transient overlays that would
//! otherwise swallow clicks. It is re-run on every request; when the surface
//! is already open that is redundant but harmless.

use std::time::Duration;

use tracing::{debug, warn};

use postwright_config::EditorConfig;

use crate::{dom::DomScope, error::EditorError, session::SessionHandle};

/// Bound on waiting for a dismissed overlay to leave the DOM.
const DISMISS_WAIT: Duration = Duration::from_secs(1);

/// Open the composer and clear overlays until editing is safe.
pub(crate) async fn open_editor(
    handle: &SessionHandle,
    cfg: &EditorConfig,
) -> Result<(), EditorError> {
    let page = &handle.page;
    let wait = Duration::from_millis(cfg.wait_timeout_ms);
    let poll = Duration::from_millis(cfg.poll_interval_ms);
    let loc = &cfg.locators;

    page.goto(cfg.write_url.as_str())
        .await
        .map_err(|e| EditorError::NavigationTimeout(format!("could not open composer: {e}")))?;
    let _ = page.wait_for_navigation().await;

    let top = DomScope::top(page, poll);
    if !top.wait_present(&loc.editor_frame, wait).await? {
        return Err(EditorError::NavigationTimeout(format!(
            "editor frame {} did not appear within {}ms",
            loc.editor_frame, cfg.wait_timeout_ms
        )));
    }

    let frame = DomScope::framed(page, &loc.editor_frame, poll);

    // Resume-draft popup: shown only when a previous draft exists, so absence
    // after the short wait is expected, not an error.
    let popup_wait = Duration::from_millis(cfg.popup_wait_ms);
    if frame.wait_clickable(&loc.popup_cancel, popup_wait).await? {
        frame.click(&loc.popup_cancel).await?;
        let gone = frame.wait_absent(&loc.popup_cancel, DISMISS_WAIT).await?;
        debug!(session_id = %handle.id, gone, "dismissed resume-draft popup");
    }

    // Help/tutorial overlays can appear several times in a row. The loop is
    // capped: an unexpected overlay pattern must not hang the request.
    let mut dismissed = 0u32;
    while dismissed < cfg.overlay_dismiss_limit {
        if !frame.exists(&loc.help_close).await? {
            break;
        }
        frame.click_js(&loc.help_close).await?;
        dismissed += 1;
        debug!(session_id = %handle.id, dismissed, "dismissed help overlay");
        // A timeout here just means another overlay with the same control
        // has already rendered; the next iteration handles it.
        frame.wait_absent(&loc.help_close, DISMISS_WAIT).await?;
    }
    if dismissed == cfg.overlay_dismiss_limit && frame.exists(&loc.help_close).await? {
        warn!(
            session_id = %handle.id,
            limit = cfg.overlay_dismiss_limit,
            "help overlay still present after dismiss limit, proceeding"
        );
    }

    Ok(())
}
