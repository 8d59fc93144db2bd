//! Config schema types (server, editor surface, credentials, locators).

use secrecy::Secret;
use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostwrightConfig {
    pub server: ServerConfig,
    pub editor: EditorConfig,
    pub credentials: CredentialsConfig,
}

/// HTTP server bind settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

/// Settings for the remote editor surface and the browser driving it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// URL of the blog post composer.
    pub write_url: String,
    /// URL of the login form.
    pub login_url: String,
    /// Path to Chrome/Chromium binary (auto-detected if not set).
    pub chrome_path: Option<String>,
    /// Whether to run the browser headless.
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Uniform budget for every locate-and-wait call, in milliseconds.
    pub wait_timeout_ms: u64,
    /// Interval between readiness probes, in milliseconds.
    pub poll_interval_ms: u64,
    /// How long to wait for the resume-draft popup before deciding it is
    /// absent, in milliseconds. Absence is not an error.
    pub popup_wait_ms: u64,
    /// Maximum number of help-overlay dismissal attempts per request.
    pub overlay_dismiss_limit: u32,
    /// Maximum length of a title derived from the body's first line.
    pub title_max_chars: usize,
    pub locators: Locators,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            write_url: "https://blog.naver.com/GoBlogWrite.naver".into(),
            login_url: "https://nid.naver.com/nidlogin.login".into(),
            chrome_path: None,
            headless: true,
            viewport_width: 1600,
            viewport_height: 950,
            wait_timeout_ms: 15_000,
            poll_interval_ms: 100,
            popup_wait_ms: 3_000,
            overlay_dismiss_limit: 5,
            title_max_chars: 30,
            locators: Locators::default(),
        }
    }
}

/// CSS selectors for the interactive elements of the remote editor.
///
/// These track the live Naver SmartEditor markup and the nid login form.
/// They are configuration, not code: when the remote surface changes, only
/// this section needs updating.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Locators {
    /// The iframe hosting the editor document.
    pub editor_frame: String,
    /// Cancel control of the "resume previous draft" popup.
    pub popup_cancel: String,
    /// Close control of the help/tutorial overlay.
    pub help_close: String,
    /// Title section of the composer.
    pub title_section: String,
    /// Body section of the composer.
    pub body_section: String,
    /// Draft-save control.
    pub save_button: String,
    pub login_id: String,
    pub login_password: String,
    pub login_submit: String,
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            editor_frame: "iframe#mainFrame".into(),
            popup_cancel: ".se-popup-button-cancel".into(),
            help_close: ".se-help-panel-close-button".into(),
            title_section: ".se-section-documentTitle".into(),
            body_section: ".se-section-text".into(),
            save_button: ".save_btn__bzc5B".into(),
            login_id: "#id".into(),
            login_password: "#pw".into(),
            login_submit: "#log\\.login".into(),
        }
    }
}

/// Authoring account credentials.
///
/// Either set in the config file (with `${ENV_VAR}` placeholders) or left
/// empty to fall back to the `NAVER_ID` / `NAVER_PW` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub id: Option<String>,
    pub password: Option<Secret<String>>,
}

/// Resolved credentials, ready for the login handshake.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub id: String,
    pub password: Secret<String>,
}

impl CredentialsConfig {
    /// Resolve credentials from the config section, falling back to the
    /// environment. Returns `None` when either half is missing.
    pub fn resolve(&self) -> Option<Credentials> {
        let id = self
            .id
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("NAVER_ID").ok().filter(|s| !s.is_empty()))?;
        let password = self
            .password
            .clone()
            .or_else(|| std::env::var("NAVER_PW").ok().map(Secret::new))?;
        Some(Credentials { id, password })
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_defaults_point_at_naver() {
        let cfg = EditorConfig::default();
        assert!(cfg.write_url.contains("blog.naver.com"));
        assert!(cfg.login_url.contains("nid.naver.com"));
        assert_eq!(cfg.wait_timeout_ms, 15_000);
        assert_eq!(cfg.title_max_chars, 30);
        assert!(cfg.headless);
    }

    #[test]
    fn locator_defaults_cover_all_contracts() {
        let loc = Locators::default();
        for sel in [
            &loc.editor_frame,
            &loc.popup_cancel,
            &loc.help_close,
            &loc.title_section,
            &loc.body_section,
            &loc.save_button,
            &loc.login_id,
            &loc.login_password,
            &loc.login_submit,
        ] {
            assert!(!sel.is_empty());
        }
    }

    #[test]
    fn credentials_resolve_from_config() {
        let cfg = CredentialsConfig {
            id: Some("writer".into()),
            password: Some(Secret::new("hunter2".into())),
        };
        let creds = cfg.resolve().unwrap();
        assert_eq!(creds.id, "writer");
    }

    #[test]
    fn credentials_missing_password_is_none() {
        // Guard against a NAVER_PW leak from the host environment.
        if std::env::var("NAVER_PW").is_ok() {
            return;
        }
        let cfg = CredentialsConfig {
            id: Some("writer".into()),
            password: None,
        };
        assert!(cfg.resolve().is_none());
    }
}
