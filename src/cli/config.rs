//! Config command for Flashdeck.
//!
//! Shows the effective configuration and edits the project config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{find_project_root, project_config_path, Config};
use crate::error::{FlashdeckError, Result};

/// A config operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the merged configuration.
    Show,
    /// Set one key in the project config file.
    Set { key: String, value: String },
}

impl ConfigAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Set { .. } => "set",
        }
    }
}

/// Options for the config command.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One changed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigChange {
    pub key: String,
    pub old: String,
    pub new: String,
}

/// Output format for the config command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Which action ran.
    pub action: String,
    /// Effective config for `show`, saved project config for `set`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,
    /// Project config file written by `set`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Values changed by `set`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ConfigChange>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub caller_error: bool,
}

impl ConfigOutput {
    fn new(action: &ConfigAction) -> Self {
        Self {
            success: true,
            action: action.name().to_string(),
            config: None,
            path: None,
            changes: vec![],
            error: None,
            caller_error: false,
        }
    }
}

/// The config command implementation.
pub struct ConfigCommand {
    cwd: PathBuf,
}

impl ConfigCommand {
    /// Create a new config command rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Run the config command.
    pub fn run(&self, action: &ConfigAction) -> ConfigOutput {
        let mut output = ConfigOutput::new(action);

        match action {
            ConfigAction::Show => {
                output.config = Some(Config::load_from_cwd(&self.cwd));
            }
            ConfigAction::Set { key, value } => match self.set(key, value) {
                Ok((config, changes)) => {
                    output.path = Some(project_config_path(&self.cwd));
                    output.config = Some(config);
                    output.changes = changes;
                }
                Err(e) => {
                    output.success = false;
                    output.caller_error = matches!(e, FlashdeckError::Config { .. });
                    output.error = Some(format!("Failed to set {}: {}", key, e));
                }
            },
        }

        output
    }

    fn set(&self, key: &str, value: &str) -> Result<(Config, Vec<ConfigChange>)> {
        let old = Config::load_project(&self.cwd)?;
        let mut new = old.clone();
        new.set(key, value)?;

        let changes: Vec<ConfigChange> = old
            .diff(&new)
            .into_iter()
            .map(|(key, old, new)| ConfigChange { key, old, new })
            .collect();

        if !changes.is_empty() {
            new.save_project(&find_project_root(&self.cwd))?;
            tracing::debug!(key, value, "updated project config");
        }

        Ok((new, changes))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ConfigOutput, options: &ConfigOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ConfigOutput) -> String {
        if !output.success {
            return format!(
                "Config failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.action == "show" {
            return output
                .config
                .as_ref()
                .and_then(|config| toml::to_string_pretty(config).ok())
                .unwrap_or_default()
                .trim_end()
                .to_string();
        }

        if output.changes.is_empty() {
            return "No changes.".to_string();
        }

        let mut lines: Vec<String> = output
            .changes
            .iter()
            .map(|c| format!("{}: {} -> {}", c.key, c.old, c.new))
            .collect();
        if let Some(path) = &output.path {
            lines.push(format!("Saved {}", path.display()));
        }
        lines.join("\n")
    }
}
