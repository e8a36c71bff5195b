use std::path::Path;

use serde_json::Value;

use super::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Json,
    Toml,
}

impl PlanFormat {
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(PlanFormat::Json),
            Some("toml") => Ok(PlanFormat::Toml),
            _ => Err(ConfigError::Invalid(format!(
                "plan '{}' must have a .json or .toml extension",
                path.display()
            ))),
        }
    }
}

/// Read a plan document as JSON, converting TOML plans on the way, so both
/// formats go through the same schema validation.
pub fn load_plan_document(path: &Path) -> ConfigResult<Value> {
    let format = PlanFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_plan_document(&content, format)
}

fn parse_plan_document(content: &str, format: PlanFormat) -> ConfigResult<Value> {
    match format {
        PlanFormat::Json => Ok(serde_json::from_str(content)?),
        PlanFormat::Toml => {
            let document: toml::Value = toml::from_str(content)?;
            Ok(serde_json::to_value(document)?)
        }
    }
}
