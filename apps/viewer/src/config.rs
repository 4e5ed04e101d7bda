use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};
use data_service::WritePolicy;

const DEFAULT_CONFIG_FILE: &str = "viewer.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: Option<u64>,
    pub write_policy: WritePolicy,
    pub render_idle_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            request_timeout_secs: None,
            write_policy: WritePolicy::default(),
            render_idle_ms: 1500,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn render_idle(&self) -> Duration {
        Duration::from_millis(self.render_idle_ms)
    }
}

/// Defaults, then the config file, then environment. An explicitly named file
/// must exist; the default `viewer.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;
    for (key, value) in &table {
        let value = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            other => return Err(anyhow!("unsupported value for '{key}': {other}")),
        };
        apply_key(settings, key, &value)?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    for key in [
        "server_url",
        "request_timeout_secs",
        "write_policy",
        "render_idle_ms",
        "log_filter",
    ] {
        let upper = key.to_ascii_uppercase();
        for var in [format!("VIEWER_{upper}"), format!("APP__{upper}")] {
            if let Some(value) = lookup(&var) {
                apply_key(settings, key, &value).with_context(|| format!("invalid {var}"))?;
            }
        }
    }
    Ok(())
}

fn apply_key(settings: &mut Settings, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "server_url" => settings.server_url = value.trim().to_string(),
        "request_timeout_secs" => {
            settings.request_timeout_secs = Some(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("'{value}' is not a number of seconds"))?,
            )
        }
        "write_policy" => settings.write_policy = value.parse()?,
        "render_idle_ms" => {
            settings.render_idle_ms = value
                .trim()
                .parse()
                .with_context(|| format!("'{value}' is not a number of milliseconds"))?
        }
        "log_filter" => settings.log_filter = value.to_string(),
        // Unknown keys are tolerated so one file can serve several tools.
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        apply_file(
            &mut settings,
            r#"
server_url = "http://loom.internal:8000"
request_timeout_secs = 30
write_policy = "last_completed"
unrelated = "ignored"
"#,
        )
        .expect("apply file");

        assert_eq!(settings.server_url, "http://loom.internal:8000");
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.write_policy, WritePolicy::LastCompleted);
        assert_eq!(settings.render_idle_ms, 1500);
    }

    #[test]
    fn env_overrides_file_and_app_prefix_wins_last() {
        let mut settings = Settings::default();
        apply_file(&mut settings, "server_url = \"http://from-file\"").expect("apply file");

        let env: HashMap<&str, &str> = HashMap::from([
            ("VIEWER_SERVER_URL", "http://from-viewer-env"),
            ("APP__SERVER_URL", "http://from-app-env"),
            ("VIEWER_RENDER_IDLE_MS", "250"),
        ]);
        apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string())).expect("apply env");

        assert_eq!(settings.server_url, "http://from-app-env");
        assert_eq!(settings.render_idle(), Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(apply_file(&mut settings, "write_policy = \"first_wins\"").is_err());
        assert!(apply_file(&mut settings, "render_idle_ms = \"soon\"").is_err());
        assert!(apply_file(&mut settings, "server_url = [1, 2]").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let err = load_settings(Some(Path::new("/nonexistent/viewer.toml")))
            .expect_err("must fail");
        assert!(err.to_string().contains("failed to read"), "unexpected: {err}");
    }
}
