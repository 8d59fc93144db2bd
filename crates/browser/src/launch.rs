//! Chromium launch for the single editing session.

use std::time::Duration;

use {
    chromiumoxide::{Browser, BrowserConfig, Page, handler::viewport::Viewport},
    futures::StreamExt,
    tracing::{debug, trace},
};

use {postwright_config::EditorConfig, rand::Rng};

use crate::error::EditorError;

/// Generate a session identifier for log correlation.
pub(crate) fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let id: u64 = rng.random();
    format!("editor-{:016x}", id)
}

/// Launch a browser and open its working page.
///
/// Automation indicators are suppressed: the remote login form inspects
/// `navigator.webdriver` and friends, and a flagged session gets a captcha
/// instead of a password field.
pub(crate) async fn launch(cfg: &EditorConfig) -> Result<(Browser, Page), EditorError> {
    let mut builder = BrowserConfig::builder();

    if !cfg.headless {
        builder = builder.with_head();
    }

    builder = builder
        .viewport(Viewport {
            width: cfg.viewport_width,
            height: cfg.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .request_timeout(Duration::from_millis(cfg.wait_timeout_ms));

    if let Some(ref path) = cfg.chrome_path {
        builder = builder.chrome_executable(path);
    }

    builder = builder
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox");

    let config = builder.build().map_err(EditorError::SessionInit)?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| EditorError::SessionInit(format!("browser launch failed: {e}")))?;

    // Drain CDP events for the lifetime of the connection.
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            trace!(?event, "browser event");
        }
        debug!("browser event handler exited (connection closed)");
    });

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| EditorError::SessionInit(format!("failed to open page: {e}")))?;

    Ok((browser, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_and_prefixed() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(a.starts_with("editor-"));
    }
}
