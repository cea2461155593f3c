use crate::domain::model::RawPropertyRecord;
use crate::utils::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML property files list records under `[[properties]]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyFile {
    pub properties: Vec<RawPropertyRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonPayload {
    Many(Vec<RawPropertyRecord>),
    One(Box<RawPropertyRecord>),
}

/// 依副檔名判斷格式：`.toml` 使用 TOML，其餘一律視為 JSON
pub fn load_properties<P: AsRef<Path>>(path: P) -> Result<Vec<RawPropertyRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let records = if is_toml {
        parse_toml_properties(&content)?
    } else {
        parse_json_properties(&content)?
    };

    tracing::debug!("Loaded {} property records from {}", records.len(), path.display());
    if records.is_empty() {
        return Err(ModelError::ConfigError {
            message: format!("No property records found in {}", path.display()),
        });
    }
    Ok(records)
}

pub fn parse_json_properties(content: &str) -> Result<Vec<RawPropertyRecord>> {
    let payload: JsonPayload = serde_json::from_str(content)?;
    Ok(match payload {
        JsonPayload::Many(records) => records,
        JsonPayload::One(record) => vec![*record],
    })
}

pub fn parse_toml_properties(content: &str) -> Result<Vec<RawPropertyRecord>> {
    let file: PropertyFile = toml::from_str(content)?;
    Ok(file.properties)
}
