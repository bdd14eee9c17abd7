//! Configuration loading for Flashdeck.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.flashdeck/config.toml`)
//! 3. User config (`~/.flashdeck/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::cloze::{ClozeStyle, VALID_CLOZE_STYLES};
use crate::core::scheduler::{LapsePolicy, VALID_LAPSE_POLICIES};
use crate::error::{FlashdeckError, Result};

/// Directory name used for both the home and project config locations.
pub const FLASHDECK_DIR: &str = ".flashdeck";

const CONFIG_FILE: &str = "config.toml";

/// Keys accepted by [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "scheduler.lapse_policy",
    "render.escape_fields",
    "render.cloze_style",
    "storage.reviews_dir",
];

/// Main configuration struct for Flashdeck.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Review scheduling.
    pub scheduler: SchedulerConfig,

    /// Card rendering.
    pub render: RenderConfig,

    /// Review storage location.
    pub storage: StorageConfig,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// What a failed review does to the ease factor.
    pub lapse_policy: LapsePolicy,
}

/// Rendering configuration for generated cards.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// HTML-escape field values before inserting them into templates.
    pub escape_fields: bool,

    /// Output style for cloze placeholders.
    pub cloze_style: ClozeStyle,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for review files. Defaults to `<flashdeck_home>/reviews`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.flashdeck/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = flashdeck_home()?;
        Self::load_optional(&home.join(CONFIG_FILE))
    }

    /// Load project config from the nearest `.flashdeck/config.toml`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = project_flashdeck_dir(cwd).join(CONFIG_FILE);
        Self::load_optional(&config_path)
    }

    /// Load a config file, treating a missing file as absent and a broken
    /// one as absent with a warning.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Load only the project config file for `cwd`.
    ///
    /// A missing file yields the defaults; a broken one is an error.
    pub fn load_project(cwd: &Path) -> Result<Config> {
        let path = project_config_path(cwd);
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| FlashdeckError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| FlashdeckError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("FLASHDECK_LAPSE_POLICY") {
            match LapsePolicy::parse(&val) {
                Some(policy) => self.scheduler.lapse_policy = policy,
                None => tracing::warn!(
                    "Invalid FLASHDECK_LAPSE_POLICY value '{}'. Valid values: {:?}. Using '{}'.",
                    val,
                    VALID_LAPSE_POLICIES,
                    self.scheduler.lapse_policy.as_str()
                ),
            }
        }

        if let Ok(val) = env::var("FLASHDECK_ESCAPE_FIELDS") {
            match parse_bool(&val) {
                Some(escape) => self.render.escape_fields = escape,
                None => tracing::warn!(
                    "Invalid FLASHDECK_ESCAPE_FIELDS value '{}'. Expected true or false. Using '{}'.",
                    val,
                    self.render.escape_fields
                ),
            }
        }

        if let Ok(val) = env::var("FLASHDECK_CLOZE_STYLE") {
            match ClozeStyle::parse(&val) {
                Some(style) => self.render.cloze_style = style,
                None => tracing::warn!(
                    "Invalid FLASHDECK_CLOZE_STYLE value '{}'. Valid values: {:?}. Using '{}'.",
                    val,
                    VALID_CLOZE_STYLES,
                    self.render.cloze_style.as_str()
                ),
            }
        }
    }

    /// Merge another config into this one, field by field.
    ///
    /// Values in `other` that differ from the defaults win. A higher layer
    /// therefore cannot reset a lower layer's customisation back to the
    /// default value.
    fn merge(mut self, other: Config) -> Self {
        let default_scheduler = SchedulerConfig::default();
        if other.scheduler.lapse_policy != default_scheduler.lapse_policy {
            self.scheduler.lapse_policy = other.scheduler.lapse_policy;
        }

        let default_render = RenderConfig::default();
        if other.render.escape_fields != default_render.escape_fields {
            self.render.escape_fields = other.render.escape_fields;
        }
        if other.render.cloze_style != default_render.cloze_style {
            self.render.cloze_style = other.render.cloze_style;
        }

        if other.storage.reviews_dir.is_some() {
            self.storage.reviews_dir = other.storage.reviews_dir;
        }

        self
    }

    /// Set one value by its dotted key. An empty `storage.reviews_dir`
    /// restores the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "scheduler.lapse_policy" => {
                self.scheduler.lapse_policy = LapsePolicy::parse(value).ok_or_else(|| {
                    FlashdeckError::config(format!(
                        "invalid lapse policy '{}', expected one of: {}",
                        value,
                        VALID_LAPSE_POLICIES.join(", ")
                    ))
                })?;
            }
            "render.escape_fields" => {
                self.render.escape_fields = parse_bool(value).ok_or_else(|| {
                    FlashdeckError::config(format!(
                        "invalid boolean '{}', expected true or false",
                        value
                    ))
                })?;
            }
            "render.cloze_style" => {
                self.render.cloze_style = ClozeStyle::parse(value).ok_or_else(|| {
                    FlashdeckError::config(format!(
                        "invalid cloze style '{}', expected one of: {}",
                        value,
                        VALID_CLOZE_STYLES.join(", ")
                    ))
                })?;
            }
            "storage.reviews_dir" => {
                self.storage.reviews_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => {
                return Err(FlashdeckError::config(format!(
                    "unknown config key '{}', expected one of: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// The effective reviews directory: the configured one, else the default.
    pub fn reviews_dir(&self) -> Option<PathBuf> {
        self.storage.reviews_dir.clone().or_else(reviews_dir)
    }

    /// Save configuration to the project config file.
    ///
    /// Writes to `.flashdeck/config.toml` in the given directory, creating the
    /// directory if needed. Uses temp file + rename.
    pub fn save_project(&self, cwd: &Path) -> Result<()> {
        let project_dir = cwd.join(FLASHDECK_DIR);

        if !project_dir.exists() {
            fs::create_dir_all(&project_dir).map_err(|e| FlashdeckError::storage(&project_dir, e))?;
        }

        let config_path = project_dir.join(CONFIG_FILE);

        let content =
            toml::to_string_pretty(self).map_err(|e| FlashdeckError::config(e.to_string()))?;

        let temp_path = project_dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| FlashdeckError::storage(&temp_path, e))?;

        let file =
            fs::File::open(&temp_path).map_err(|e| FlashdeckError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| FlashdeckError::storage(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &config_path)
            .map_err(|e| FlashdeckError::storage(&config_path, e))?;

        Ok(())
    }

    /// List changed values between two configs as (key, old, new).
    pub fn diff(&self, other: &Config) -> Vec<(String, String, String)> {
        let mut changes = Vec::new();

        if self.scheduler.lapse_policy != other.scheduler.lapse_policy {
            changes.push((
                "scheduler.lapse_policy".to_string(),
                self.scheduler.lapse_policy.as_str().to_string(),
                other.scheduler.lapse_policy.as_str().to_string(),
            ));
        }

        if self.render.escape_fields != other.render.escape_fields {
            changes.push((
                "render.escape_fields".to_string(),
                self.render.escape_fields.to_string(),
                other.render.escape_fields.to_string(),
            ));
        }

        if self.render.cloze_style != other.render.cloze_style {
            changes.push((
                "render.cloze_style".to_string(),
                self.render.cloze_style.as_str().to_string(),
                other.render.cloze_style.as_str().to_string(),
            ));
        }

        if self.storage.reviews_dir != other.storage.reviews_dir {
            let show = |dir: &Option<PathBuf>| {
                dir.as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_else(|| "(default)".to_string())
            };
            changes.push((
                "storage.reviews_dir".to_string(),
                show(&self.storage.reviews_dir),
                show(&other.storage.reviews_dir),
            ));
        }

        changes
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Get the Flashdeck home directory.
///
/// Checks `FLASHDECK_HOME` first, then falls back to `~/.flashdeck`. An empty
/// `FLASHDECK_HOME` is ignored; a relative one is canonicalised when it exists.
pub fn flashdeck_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("FLASHDECK_HOME") {
        if home.is_empty() {
            tracing::warn!("FLASHDECK_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("FLASHDECK_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(FLASHDECK_DIR))
}

/// Get the default reviews directory.
///
/// Returns `<flashdeck_home>/reviews/`.
pub fn reviews_dir() -> Option<PathBuf> {
    flashdeck_home().map(|h| h.join("reviews"))
}

/// Find the project root for a given working directory.
///
/// Walks up from `cwd` looking for an existing `.flashdeck/` directory and
/// falls back to `cwd` itself.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|ancestor| ancestor.join(FLASHDECK_DIR).is_dir())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Get the project `.flashdeck/` directory for a working directory.
pub fn project_flashdeck_dir(cwd: &Path) -> PathBuf {
    find_project_root(cwd).join(FLASHDECK_DIR)
}

/// Path of the project config file for a working directory.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    project_flashdeck_dir(cwd).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "FLASHDECK_HOME",
        "FLASHDECK_LAPSE_POLICY",
        "FLASHDECK_ESCAPE_FIELDS",
        "FLASHDECK_CLOZE_STYLE",
    ];

    /// Point FLASHDECK_HOME at an empty directory and clear overrides.
    fn isolated_home() -> TempDir {
        for var in ENV_VARS {
            env::remove_var(var);
        }
        let home = TempDir::new().unwrap();
        env::set_var("FLASHDECK_HOME", home.path());
        home
    }

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    fn write_project_config(dir: &Path, content: &str) {
        let project_dir = dir.join(FLASHDECK_DIR);
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::KeepEase);
        assert!(!config.render.escape_fields);
        assert_eq!(config.render.cloze_style, ClozeStyle::Html);
        assert!(config.storage.reviews_dir.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[scheduler]
lapse_policy = "penalize"

[render]
escape_fields = true
cloze_style = "plain"

[storage]
reviews_dir = "/var/lib/flashdeck"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::Penalize);
        assert!(config.render.escape_fields);
        assert_eq!(config.render.cloze_style, ClozeStyle::Plain);
        assert_eq!(
            config.storage.reviews_dir,
            Some(PathBuf::from("/var/lib/flashdeck"))
        );
    }

    #[test]
    fn test_load_from_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, FlashdeckError::Storage { .. }));
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(matches!(err, FlashdeckError::Config { .. }));
    }

    #[test]
    fn test_unknown_policy_in_file_is_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[scheduler]\nlapse_policy = \"harsh\"\n").unwrap();

        assert!(Config::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[render]\nescape_fields = true\n").unwrap();
        assert!(config.render.escape_fields);
        assert_eq!(config.render.cloze_style, ClozeStyle::Html);
        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::KeepEase);
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[render]\ncloze_style = \"plain\"\n");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.render.cloze_style, ClozeStyle::Plain);
        assert!(!config.render.escape_fields);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_project_overrides_user_config() {
        let home = isolated_home();
        fs::write(
            home.path().join(CONFIG_FILE),
            "[scheduler]\nlapse_policy = \"penalize\"\n[render]\nescape_fields = true\n",
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[render]\ncloze_style = \"plain\"\n");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::Penalize);
        assert!(config.render.escape_fields);
        assert_eq!(config.render.cloze_style, ClozeStyle::Plain);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_project_config_found_in_ancestor() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[scheduler]\nlapse_policy = \"penalize\"\n");
        let nested = dir.path().join("decks").join("german");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::load_from_cwd(&nested);
        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::Penalize);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_broken_project_config_falls_back_to_defaults() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[[[");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config, Config::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[render]\ncloze_style = \"plain\"\n");

        env::set_var("FLASHDECK_CLOZE_STYLE", "html");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.render.cloze_style, ClozeStyle::Html);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        env::set_var("FLASHDECK_LAPSE_POLICY", "penalize");
        env::set_var("FLASHDECK_ESCAPE_FIELDS", "1");
        env::set_var("FLASHDECK_CLOZE_STYLE", "plain");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::Penalize);
        assert!(config.render.escape_fields);
        assert_eq!(config.render.cloze_style, ClozeStyle::Plain);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_values_ignored() {
        clear_env();
        env::set_var("FLASHDECK_LAPSE_POLICY", "brutal");
        env::set_var("FLASHDECK_ESCAPE_FIELDS", "maybe");
        env::set_var("FLASHDECK_CLOZE_STYLE", "markdown");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config, Config::default());

        clear_env();
    }

    #[test]
    fn test_merge_field_by_field() {
        let base = Config {
            scheduler: SchedulerConfig {
                lapse_policy: LapsePolicy::Penalize,
            },
            render: RenderConfig {
                escape_fields: true,
                cloze_style: ClozeStyle::Html,
            },
            storage: StorageConfig::default(),
        };
        let other = Config {
            render: RenderConfig {
                escape_fields: false,
                cloze_style: ClozeStyle::Plain,
            },
            storage: StorageConfig {
                reviews_dir: Some(PathBuf::from("/tmp/reviews")),
            },
            ..Default::default()
        };

        let merged = base.merge(other);
        // Defaults in the higher layer don't reset lower-layer values
        assert_eq!(merged.scheduler.lapse_policy, LapsePolicy::Penalize);
        assert!(merged.render.escape_fields);
        assert_eq!(merged.render.cloze_style, ClozeStyle::Plain);
        assert_eq!(
            merged.storage.reviews_dir,
            Some(PathBuf::from("/tmp/reviews"))
        );
    }

    #[test]
    #[serial]
    fn test_flashdeck_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("FLASHDECK_HOME", dir.path());

        assert_eq!(flashdeck_home().unwrap(), dir.path());
        assert_eq!(reviews_dir().unwrap(), dir.path().join("reviews"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_flashdeck_home_empty_env() {
        env::set_var("FLASHDECK_HOME", "");

        if let Some(home) = flashdeck_home() {
            assert!(home.ends_with(FLASHDECK_DIR));
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn test_configured_reviews_dir_wins() {
        let _home = isolated_home();
        let config = Config {
            storage: StorageConfig {
                reviews_dir: Some(PathBuf::from("/data/reviews")),
            },
            ..Default::default()
        };
        assert_eq!(config.reviews_dir(), Some(PathBuf::from("/data/reviews")));
        assert!(Config::default()
            .reviews_dir()
            .unwrap()
            .ends_with("reviews"));

        clear_env();
    }

    #[test]
    fn test_find_project_root() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        // No .flashdeck anywhere below the temp root: falls back to cwd
        // unless an ancestor of the temp dir happens to have one.
        let root = find_project_root(&nested);
        assert!(nested.starts_with(&root));

        fs::create_dir_all(dir.path().join("a").join(FLASHDECK_DIR)).unwrap();
        assert_eq!(find_project_root(&nested), dir.path().join("a"));
        assert_eq!(
            project_flashdeck_dir(&nested),
            dir.path().join("a").join(FLASHDECK_DIR)
        );
    }

    #[test]
    fn test_save_project_creates_config_file() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            scheduler: SchedulerConfig {
                lapse_policy: LapsePolicy::Penalize,
            },
            ..Default::default()
        };

        config.save_project(dir.path()).unwrap();

        let config_path = dir.path().join(FLASHDECK_DIR).join(CONFIG_FILE);
        assert!(config_path.exists());
        assert!(!dir
            .path()
            .join(FLASHDECK_DIR)
            .join(".config.toml.tmp")
            .exists());

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_project_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        Config::default().save_project(dir.path()).unwrap();

        let mut config = Config::default();
        config.render.cloze_style = ClozeStyle::Plain;
        config.save_project(dir.path()).unwrap();

        let loaded =
            Config::load_from_file(&dir.path().join(FLASHDECK_DIR).join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded.render.cloze_style, ClozeStyle::Plain);
    }

    #[test]
    fn test_set_each_key() {
        let mut config = Config::default();
        config.set("scheduler.lapse_policy", "penalize").unwrap();
        config.set("render.escape_fields", "1").unwrap();
        config.set("render.cloze_style", "plain").unwrap();
        config.set("storage.reviews_dir", "/tmp/reviews").unwrap();

        assert_eq!(config.scheduler.lapse_policy, LapsePolicy::Penalize);
        assert!(config.render.escape_fields);
        assert_eq!(config.render.cloze_style, ClozeStyle::Plain);
        assert_eq!(
            config.storage.reviews_dir,
            Some(PathBuf::from("/tmp/reviews"))
        );

        config.set("storage.reviews_dir", "").unwrap();
        assert!(config.storage.reviews_dir.is_none());
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_values() {
        let mut config = Config::default();
        let err = config.set("scheduler.speed", "fast").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));

        assert!(config.set("scheduler.lapse_policy", "harsh").is_err());
        assert!(config.set("render.escape_fields", "yes").is_err());
        assert!(config.set("render.cloze_style", "fancy").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_project_missing_is_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load_project(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_load_project_broken_is_error() {
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[scheduler\nlapse_policy = ");
        assert!(Config::load_project(dir.path()).is_err());
    }

    #[test]
    fn test_diff_no_changes() {
        assert!(Config::default().diff(&Config::default()).is_empty());
    }

    #[test]
    fn test_diff_multiple_changes() {
        let old = Config::default();
        let mut new = Config::default();
        new.scheduler.lapse_policy = LapsePolicy::Penalize;
        new.render.cloze_style = ClozeStyle::Plain;

        let changes = old.diff(&new);
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes[0],
            (
                "scheduler.lapse_policy".to_string(),
                "keep-ease".to_string(),
                "penalize".to_string()
            )
        );
        assert_eq!(changes[1].0, "render.cloze_style");
    }
}
