use std::path::Path;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use reqwest::Url;
use serde::Deserialize;

use crate::tracker::{ExtraField, IssueTypes};

const DEFAULT_CONFIG_NAME: &str = "wat2jira";
const ENV_PREFIX: &str = "WAT2JIRA";

const DEFAULT_SITE_URL: &str = "https://wa.aws.amazon.com";
const DEFAULT_MAP_PATH: &str = "wat.map.en.html";
const DEFAULT_PILLAR_IDS: &[&str] = &[
    "sustainability",
    "costOptimization",
    "performance",
    "reliability",
    "operationalExcellence",
    "security",
];

/// Run settings, loaded once at startup and read-only afterwards.
///
/// Tracker credentials are not part of it; they come from the command line
/// and the password prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub site_url: String,
    pub map_path: String,
    pub pillar_ids: Vec<String>,
    pub resources_heading: String,
    pub issue_types: IssueTypes,
    pub classification: Classification,
}

/// Extra field stamped on every mid-level record.
#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    pub field: String,
    pub value: Option<String>,
}

impl Classification {
    /// The configured value as JSON: numbers and objects pass through, anything
    /// else is sent as a plain string.
    pub fn to_extra_field(&self) -> Option<ExtraField> {
        let raw = self.value.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        Some(ExtraField {
            name: self.field.clone(),
            value,
        })
    }
}

impl Settings {
    /// Defaults, then the TOML file (`path`, or `./wat2jira.toml` when present),
    /// then `WAT2JIRA_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("pillar_ids");

        Self::from_builder(defaults()?.add_source(file).add_source(env))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    /// Absolute URL of the diagram page.
    pub fn map_url(&self) -> Result<Url> {
        let site = Url::parse(&self.site_url)
            .with_context(|| format!("Invalid site_url: {}", self.site_url))?;
        site.join(&self.map_path)
            .with_context(|| format!("Invalid map_path: {}", self.map_path))
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    let pillars: Vec<String> = DEFAULT_PILLAR_IDS.iter().map(|s| s.to_string()).collect();
    Ok(Config::builder()
        .set_default("site_url", DEFAULT_SITE_URL)?
        .set_default("map_path", DEFAULT_MAP_PATH)?
        .set_default("pillar_ids", pillars)?
        .set_default("resources_heading", "Resources")?
        .set_default("issue_types.top", "Epic")?
        .set_default("issue_types.mid", "Story")?
        .set_default("issue_types.leaf", "Subtask")?
        .set_default("classification.field", "customfield_10026")?)
}
