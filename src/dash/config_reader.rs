use crate::dash::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_DIRECTORY: &str = ".compdash";
pub const DEFAULT_STORAGE_KEY: &str = "KYU_CORE_COMP_2026_DATA_V4";

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub model: String,
    pub endpoint: String,
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,
    pub temperature: f32,
    #[serde(rename = "chatTemperature")]
    pub chat_temperature: f32,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            model: "gemini-3-pro-preview".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
            temperature: 0.3,
            chat_temperature: 0.4,
            timeout_secs: 60,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    #[serde(rename = "storageDirectory")]
    pub storage_directory: String,
    #[serde(rename = "storageKey")]
    pub storage_key: String,
    pub report: ReportSettings,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            storage_directory: DEFAULT_STORAGE_DIRECTORY.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            report: ReportSettings::default(),
        }
    }
}

pub fn read_config(path: &str) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    info!("read_config: {:?}", path);
    Ok(config)
}

/// Removes the `updatedAt` stamps, which change with every upload.
pub fn without_dates(js: &JSValue) -> JSValue {
    match js {
        JSValue::Object(obj) => JSValue::Object(
            obj.iter()
                .filter(|(k, _)| k.as_str() != "updatedAt")
                .map(|(k, v)| (k.clone(), without_dates(v)))
                .collect(),
        ),
        JSValue::Array(l) => JSValue::Array(l.iter().map(without_dates).collect()),
        x => x.clone(),
    }
}

/// Reads a reference summary, for comparison with a computed one.
pub fn read_summary(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", path);
    Ok(without_dates(&js))
}
