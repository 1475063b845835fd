//! Config subcommand handlers: the command-line stand-in for the settings
//! popup.

#[cfg(test)]
#[path = "cmd_config_tests.rs"]
mod tests;

use serde_json::Value;
use tracing::info;

use pagewatch_config::{AppConfig, ConfigValidator, MonitorConfig};
use pagewatch_protocols::{keys, ConfigStore};
use pagewatch_store::FileConfigStore;

use crate::cli::ConfigAction;

/// Settings given on the command line. `None` keeps the stored value.
#[derive(Debug, Default)]
pub(crate) struct SettingsUpdate {
    pub interval: Option<u64>,
    pub target_url: Option<String>,
    pub keywords: Vec<String>,
    pub min_count: Option<u32>,
    pub enabled: Option<bool>,
}

impl SettingsUpdate {
    /// Whether anything besides the on/off switch changes.
    fn touches_settings(&self) -> bool {
        self.interval.is_some()
            || self.target_url.is_some()
            || !self.keywords.is_empty()
            || self.min_count.is_some()
    }

    fn apply(self, mut config: MonitorConfig) -> MonitorConfig {
        if let Some(interval) = self.interval {
            config.interval_seconds = Some(interval);
        }
        if let Some(url) = self.target_url {
            config.target_url = Some(url.trim().to_string());
        }
        if !self.keywords.is_empty() {
            config.keywords = self
                .keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
        if let Some(min_count) = self.min_count {
            config.min_match_count = Some(min_count);
        }
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        config
    }
}

/// Handle config subcommands.
pub(crate) async fn handle_config_command(
    action: ConfigAction,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileConfigStore::open(config.store_path()).await?;

    match action {
        ConfigAction::Show { format } => show_settings(&store, &format).await,
        ConfigAction::Set {
            interval,
            target_url,
            keywords,
            min_count,
            enable,
            disable,
        } => {
            let enabled = match (enable, disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let update = SettingsUpdate {
                interval,
                target_url,
                keywords,
                min_count,
                enabled,
            };
            let saved = save_settings(&store, update).await?;
            println!(
                "Saved settings to {} (monitoring {})",
                store.path().display(),
                if saved.enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
    }
}

/// Print stored settings and the validation report.
async fn show_settings(
    store: &FileConfigStore,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = store.get_all().await?;
    let settings = MonitorConfig::from_entries(&entries)?;
    let report = ConfigValidator::validate(&settings);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&Value::Object(entries))?);
        }
        _ => {
            println!("{:<14} {}", "KEY", "VALUE");
            println!("{}", "-".repeat(50));
            for key in keys::ALL {
                let value = entries
                    .get(*key)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<14} {}", key, value);
            }
            println!();
            println!("Store: {}", store.path().display());
        }
    }

    for error in &report.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    for warning in &report.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    if report.is_valid() {
        println!("Settings are valid.");
    }

    Ok(())
}

/// Merge `update` into the stored settings and write them back.
///
/// Changing any setting validates the whole form first; flipping only the
/// on/off switch does not.
pub(crate) async fn save_settings(
    store: &dyn ConfigStore,
    update: SettingsUpdate,
) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let entries = store.get_all().await?;
    let current = MonitorConfig::from_entries(&entries)?;

    let validate = update.touches_settings();
    let next = update.apply(current);
    if validate {
        ConfigValidator::validate_input(&next)?;
    }

    store.set(next.to_entries()).await?;
    info!("Settings saved");
    Ok(next)
}
