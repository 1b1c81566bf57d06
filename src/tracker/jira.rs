use std::fmt;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{NewRecord, Tracker, TrackerError};
use crate::fetch::USER_AGENT;

const ISSUE_PATH: &str = "rest/api/2/issue";
/// Jira refuses longer summaries.
const SUMMARY_LIMIT: usize = 255;

/// Connection details for one Jira instance. Built once from the command line
/// and the password prompt.
pub struct JiraConfig {
    pub base_url: Url,
    pub user: String,
    secret: String,
}

impl JiraConfig {
    pub fn new(base_url: Url, user: String, secret: String) -> Self {
        Self {
            base_url,
            user,
            secret,
        }
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url.as_str())
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

pub struct JiraClient {
    client: Client,
    endpoint: Url,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build Jira HTTP client")?;
        let endpoint = issue_endpoint(&config.base_url)
            .with_context(|| format!("Invalid Jira URL: {}", config.base_url))?;
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }
}

impl Tracker for JiraClient {
    fn create_record(&mut self, record: &NewRecord) -> Result<String, TrackerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.config.user, Some(&self.config.secret))
            .json(&issue_payload(record))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(TrackerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        created_key(&body)
    }
}

/// Issue endpoint below the instance URL, keeping any context path.
fn issue_endpoint(base: &Url) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(ISSUE_PATH)?)
}

fn issue_payload(record: &NewRecord) -> Value {
    let summary: String = record.summary.chars().take(SUMMARY_LIMIT).collect();
    let mut fields = json!({
        "project": { "key": record.project_key },
        "summary": summary,
        "description": record.description,
        "issuetype": { "name": record.issue_type },
    });
    if let Some(parent) = &record.parent_key {
        fields["parent"] = json!({ "key": parent });
    }
    if let Some(extra) = &record.extra_field {
        fields[extra.name.as_str()] = extra.value.clone();
    }
    json!({ "fields": fields })
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: Option<String>,
}

fn created_key(body: &str) -> Result<String, TrackerError> {
    serde_json::from_str::<CreatedIssue>(body)
        .ok()
        .and_then(|issue| issue.key)
        .filter(|key| !key.is_empty())
        .ok_or(TrackerError::MissingKey)
}
