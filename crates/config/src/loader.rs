use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::PostwrightConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "postwright.toml",
    "postwright.yaml",
    "postwright.yml",
    "postwright.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<PostwrightConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./postwright.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/postwright/postwright.{toml,yaml,yml,json}` (user-global)
///
/// Returns `PostwrightConfig::default()` if no config file is found.
pub fn discover_and_load() -> PostwrightConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    PostwrightConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "postwright") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<PostwrightConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_toml_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postwright.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[server]\nport = 9999\n\n[editor]\nheadless = false\nwait_timeout_ms = 5000"
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.port, 9999);
        assert!(!cfg.editor.headless);
        assert_eq!(cfg.editor.wait_timeout_ms, 5000);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.editor.title_max_chars, 30);
    }

    #[test]
    fn loads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postwright.json");
        std::fs::write(&path, r#"{"server": {"bind": "0.0.0.0"}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn unreadable_path_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/postwright.toml")).is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postwright.toml");
        std::fs::write(&path, "[server\nport=").unwrap();
        assert!(load_config(&path).is_err());
    }
}
