//! `logvault config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use logvault_core::config::LogvaultConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Replacement text for secrets in displayed configuration.
const REDACTED: &str = "***REDACTED***";

/// Sections accepted by `config show --section`.
const SECTIONS: [&str; 3] = ["general", "client", "query"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Attempts to load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (parse errors, invalid values).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = validation_report(config_path).await;
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Loads the file and turns the outcome into a report.
pub async fn validation_report(config_path: &Path) -> ConfigValidationReport {
    let errors = match LogvaultConfig::load(config_path).await {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };
    ConfigValidationReport {
        source: config_path.display().to_string(),
        valid: errors.is_empty(),
        errors,
    }
}

/// Execute the config show subcommand.
///
/// Loads and displays the effective configuration (file + env overrides + defaults)
/// with the bearer token redacted.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let mut config = LogvaultConfig::load(config_path).await?;
    redact_credentials(&mut config);

    let report = show_report(&config, config_path, section)?;
    writer.render(&report)?;

    Ok(())
}

/// Builds the display report for the whole config or one section.
pub fn show_report(
    config: &LogvaultConfig,
    config_path: &Path,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let (config_toml, config_json) = match section.as_deref() {
        None => (toml::to_string_pretty(config), serde_json::to_value(config)),
        Some("general") => (
            toml::to_string_pretty(&config.general),
            serde_json::to_value(&config.general),
        ),
        Some("client") => (
            toml::to_string_pretty(&config.client),
            serde_json::to_value(&config.client),
        ),
        Some("query") => (
            toml::to_string_pretty(&config.query),
            serde_json::to_value(&config.query),
        ),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml: config_toml.unwrap_or_else(|e| format!("(serialization error: {})", e)),
        config: config_json?,
    })
}

/// Replaces the static bearer token with a marker.
///
/// The token file path is shown as-is; only its contents are secret.
fn redact_credentials(config: &mut LogvaultConfig) {
    if !config.client.token.is_empty() {
        config.client.token = REDACTED.to_owned();
    }
}

/// Configuration display report.
///
/// `config_toml` is only used for text rendering; JSON output carries the
/// structured `config` value instead.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration (with redacted credentials)
    #[serde(skip)]
    pub config_toml: String,
    /// Structured configuration (with redacted credentials)
    pub config: serde_json::Value,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(report: &impl Render) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_redact_static_token() {
        let mut config = LogvaultConfig::default();
        config.client.token = "eyJhbGciOi.secret".to_owned();
        config.client.token_path = String::new();

        redact_credentials(&mut config);
        assert_eq!(config.client.token, REDACTED);
    }

    #[test]
    fn test_redact_leaves_empty_token_alone() {
        let mut config = LogvaultConfig::default();
        config.client.token_path = "/var/run/secrets/token".to_owned();

        redact_credentials(&mut config);
        assert!(config.client.token.is_empty());
        assert_eq!(config.client.token_path, "/var/run/secrets/token");
    }

    #[test]
    fn test_show_report_full_config() {
        let config = LogvaultConfig::default();
        let report = show_report(&config, Path::new("logvault.toml"), None).unwrap();

        assert!(report.section.is_none());
        assert!(report.config_toml.contains("[general]"));
        assert!(report.config_toml.contains("[client]"));
        assert_eq!(report.config["query"]["page_size"], 100);
    }

    #[test]
    fn test_show_report_single_section() {
        let config = LogvaultConfig::default();
        let report =
            show_report(&config, Path::new("logvault.toml"), Some("client".to_owned())).unwrap();

        assert_eq!(report.section.as_deref(), Some("client"));
        assert!(report.config_toml.contains("base_url"));
        assert!(!report.config_toml.contains("log_level"));
        assert_eq!(report.config["timeout_secs"], 60);
    }

    #[test]
    fn test_show_report_unknown_section() {
        let config = LogvaultConfig::default();
        let err = show_report(&config, Path::new("logvault.toml"), Some("storage".to_owned()))
            .err()
            .expect("unknown section should fail");
        assert!(matches!(err, CliError::Command(_)));
        assert!(err.to_string().contains("general, client, query"));
    }

    #[test]
    fn test_config_report_json_skips_toml_text() {
        let config = LogvaultConfig::default();
        let report =
            show_report(&config, Path::new("logvault.toml"), Some("general".to_owned())).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("config_toml").is_none());
        assert_eq!(json["section"], "general");
        assert_eq!(json["config"]["log_format"], "pretty");
    }

    #[test]
    fn test_config_report_render_text_section() {
        let report = ConfigReport {
            source: "test.toml".to_owned(),
            section: Some("general".to_owned()),
            config_toml: "log_level = \"debug\"\n".to_owned(),
            config: serde_json::Value::Null,
        };

        let output = render(&report);
        assert!(output.contains("[general]"), "should contain section label");
        assert!(output.contains("test.toml"), "should contain source");
        assert!(output.contains("log_level = \"debug\""));
    }

    #[test]
    fn test_validation_report_render_valid() {
        let report = ConfigValidationReport {
            source: "test.toml".to_owned(),
            valid: true,
            errors: Vec::new(),
        };

        let output = render(&report);
        assert!(output.contains("VALID"));
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn test_validation_report_render_invalid() {
        let report = ConfigValidationReport {
            source: "test.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'client.base_url'".to_owned()],
        };

        let output = render(&report);
        assert!(output.contains("INVALID"));
        assert!(output.contains("client.base_url"));
    }
}
