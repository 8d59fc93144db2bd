//! Lazy session bring-up and the login handshake.
//!
//! Exactly one session exists per process. It is created on the first edit
//! request, authenticated once, and reused for every request after that.
//! Init or auth failure is sticky: the slot moves to `Failed` and stays
//! there until the process is restarted.

use std::time::{Duration, Instant};

use {
    chromiumoxide::{Browser, Page},
    secrecy::ExposeSecret,
    tracing::{debug, info},
};

use postwright_config::{Credentials, EditorConfig};

use crate::{dom::DomScope, error::EditorError, launch};

/// One live, authenticated browser connection.
pub(crate) struct SessionHandle {
    pub(crate) id: String,
    // Held so the browser process outlives the handle; dropping it kills Chrome.
    #[allow(dead_code)]
    pub(crate) browser: Browser,
    pub(crate) page: Page,
}

/// Session lifecycle. The transient authenticating phase lives inside
/// [`ensure`]; callers only ever observe these three states.
pub(crate) enum SessionSlot {
    Uninitialized,
    Ready(SessionHandle),
    Failed(String),
}

/// Return the live session, creating and authenticating it on first use.
/// Idempotent: a `Ready` slot is returned unchanged, with no re-login.
pub(crate) async fn ensure<'a>(
    slot: &'a mut SessionSlot,
    cfg: &EditorConfig,
    credentials: &Credentials,
) -> Result<&'a SessionHandle, EditorError> {
    if let SessionSlot::Failed(reason) = slot {
        return Err(EditorError::SessionInit(format!(
            "session previously failed, restart required: {reason}"
        )));
    }

    if matches!(slot, SessionSlot::Uninitialized) {
        debug!("no live session, starting one");
        match bring_up(cfg, credentials).await {
            Ok(handle) => {
                info!(session_id = %handle.id, "session ready");
                *slot = SessionSlot::Ready(handle);
            },
            Err(e) => {
                *slot = SessionSlot::Failed(e.to_string());
                return Err(e);
            },
        }
    }

    match slot {
        SessionSlot::Ready(handle) => Ok(handle),
        _ => Err(EditorError::SessionInit("session unavailable".into())),
    }
}

async fn bring_up(
    cfg: &EditorConfig,
    credentials: &Credentials,
) -> Result<SessionHandle, EditorError> {
    let id = launch::generate_session_id();
    let (browser, page) = launch::launch(cfg).await?;
    info!(session_id = %id, headless = cfg.headless, "launched browser");

    login(&page, cfg, credentials).await?;
    info!(session_id = %id, account = %credentials.id, "logged in");

    Ok(SessionHandle { id, browser, page })
}

/// Perform the login handshake: open the auth surface, paste the identifier
/// and secret into their fields, submit, and wait until the surface is left.
///
/// Credentials go in via a single text-insertion event rather than per-key
/// dispatch; keystroke cadence is one of the signals the login form's bot
/// detection looks at.
async fn login(
    page: &Page,
    cfg: &EditorConfig,
    credentials: &Credentials,
) -> Result<(), EditorError> {
    let wait = Duration::from_millis(cfg.wait_timeout_ms);
    let poll = Duration::from_millis(cfg.poll_interval_ms);
    let loc = &cfg.locators;

    page.goto(cfg.login_url.as_str())
        .await
        .map_err(|e| EditorError::Auth(format!("could not open login page: {e}")))?;
    let _ = page.wait_for_navigation().await;

    let dom = DomScope::top(page, poll);

    if !dom.wait_clickable(&loc.login_id, wait).await? {
        return Err(EditorError::Auth(format!(
            "login field {} not found",
            loc.login_id
        )));
    }
    dom.click(&loc.login_id).await?;
    dom.insert_text(&credentials.id).await?;

    if !dom.wait_clickable(&loc.login_password, wait).await? {
        return Err(EditorError::Auth(format!(
            "login field {} not found",
            loc.login_password
        )));
    }
    dom.click(&loc.login_password).await?;
    dom.insert_text(credentials.password.expose_secret()).await?;

    dom.click(&loc.login_submit).await?;

    // Settled means the auth surface has been left behind. Polling the URL
    // bounds the wait by actual readiness instead of a guessed sleep.
    let deadline = Instant::now() + wait;
    loop {
        let url = page.url().await.ok().flatten().unwrap_or_default();
        if !url.is_empty() && !url.contains("nidlogin") {
            debug!(url, "login settled");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(EditorError::Auth(format!(
                "login did not settle within {}ms (still at {url})",
                cfg.wait_timeout_ms
            )));
        }
        tokio::time::sleep(poll).await;
    }
}
