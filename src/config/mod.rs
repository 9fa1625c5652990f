/// Configuration system for callsight.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::CallsightConfig::default()`]
/// 2. **User global config** — `~/.callsight/config.toml`
/// 3. **Project local config** — `.callsight.toml` in the current working directory
/// 4. **Environment variables** — `CALLSIGHT_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to the previous layer's values.
///
/// # Usage
///
/// ```rust,ignore
/// use callsight::config;
///
/// let cfg = config::load();
/// let client = BackendClient::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::CallsightConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved callsight configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for all modules that need
/// configuration.
pub fn load() -> CallsightConfig {
    let mut config = CallsightConfig::default();

    // Layer 2: user global config (~/.callsight/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, &global);
    }

    // Layer 3: project local config (.callsight.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, &project);
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A malformed config file must never take the
/// dashboard down, so parse errors are silently ignored.
fn load_toml_file(path: Option<PathBuf>) -> Option<CallsightConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge a loaded config layer into the base config.
///
/// Each TOML file is deserialized with `serde(default)`, so unset keys in
/// the overlay already carry the built-in defaults. Replacing the base
/// wholesale therefore applies exactly the keys the user set while keeping
/// defaults for the rest.
fn merge_config(base: &mut CallsightConfig, overlay: &CallsightConfig) {
    *base = overlay.clone();
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.callsight/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".callsight").join("config.toml"))
}

/// Path to the project local config: `.callsight.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".callsight.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Expand a leading `~` in a configured path to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CALLSIGHT_ADDR` — dashboard bind address
/// - `CALLSIGHT_BACKEND_URL` — reasoning backend base URL
/// - `CALLSIGHT_BACKEND_TIMEOUT_MS` — backend request timeout
/// - `CALLSIGHT_ATTACH_CONTEXT` — send transcript context with chat requests
/// - `CALLSIGHT_TRANSCRIPT_PATH` — transcript JSON document path
/// - `CALLSIGHT_LOGGING` — request logging enabled (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut CallsightConfig) {
    if let Ok(val) = std::env::var("CALLSIGHT_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("CALLSIGHT_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("CALLSIGHT_BACKEND_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("CALLSIGHT_ATTACH_CONTEXT") {
        config.backend.attach_context = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("CALLSIGHT_TRANSCRIPT_PATH")
        && !val.is_empty()
    {
        config.transcript.path = val;
    }
    if let Ok(val) = std::env::var("CALLSIGHT_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.callsight/config.toml`.
///
/// Creates the `~/.callsight/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.callsight/ directory")?;
    }

    fs::write(&path, CallsightConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `backend.base_url`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&CallsightConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;

    set_toml_value(&mut value_table, key, value)?;

    let output = toml::to_string_pretty(&value_table).context("failed to serialize config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.is_empty() {
        anyhow::bail!("empty config key");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Determine the type of the existing value to parse correctly
    let existing = table.get(leaf);
    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn expand_tilde_leaves_plain_paths_alone() {
        assert_eq!(expand_tilde("data/transcript.json"), PathBuf::from("data/transcript.json"));
        assert_eq!(expand_tilde("/tmp/log.jsonl"), PathBuf::from("/tmp/log.jsonl"));
    }

    #[test]
    fn expand_tilde_resolves_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x.jsonl"), home.join("x.jsonl"));
        }
    }

    #[test]
    fn set_toml_value_updates_string() {
        let toml_str = r#"
[backend]
base_url = "http://127.0.0.1:8000"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "backend.base_url", "http://10.0.0.2:8000").unwrap();

        let table = root.as_table().unwrap();
        let backend = table["backend"].as_table().unwrap();
        assert_eq!(backend["base_url"].as_str(), Some("http://10.0.0.2:8000"));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let toml_str = r#"
[backend]
attach_context = true
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "backend.attach_context", "false").unwrap();

        let table = root.as_table().unwrap();
        let backend = table["backend"].as_table().unwrap();
        assert_eq!(backend["attach_context"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let toml_str = r#"
[backend]
timeout_ms = 10000
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "backend.timeout_ms", "2500").unwrap();

        let table = root.as_table().unwrap();
        let backend = table["backend"].as_table().unwrap();
        assert_eq!(backend["timeout_ms"].as_integer(), Some(2500));
    }

    #[test]
    fn set_toml_value_rejects_invalid_key() {
        let toml_str = r#"
[server]
addr = "127.0.0.1:8787"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        let result = set_toml_value(&mut root, "nonexistent.key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let result = show_effective_config();
        assert!(result.is_ok());
        let toml_str = result.unwrap();
        // Should be parseable back
        let _: CallsightConfig = toml::from_str(&toml_str).unwrap();
    }
}
