//! Jira Cloud provider over the REST API v3.

pub mod adf;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use self::adf::DocNode;
use super::{Provider, ProviderFuture};
use crate::config::JiraConfig;
use crate::error::SyncError;
use crate::model::{null_as_default, RemoteIssue};
use crate::sync::mapper::jira::{CATEGORY_DONE, CATEGORY_NEW};

/// Provider ID of Jira.
pub const PROVIDER_ID: &str = "jira";

const API: &str = "/rest/api/3";
const PAGE_SIZE: &str = "200";
const SEARCH_FIELDS: &str = "summary,description,status,labels,issuetype,priority,created,updated";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default, deserialize_with = "null_as_default")]
    issues: Vec<JiraIssue>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraFields,
}

#[derive(Debug, Deserialize)]
struct JiraFields {
    #[serde(default)]
    summary: String,
    description: Option<DocNode>,
    status: Option<JiraStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    labels: Vec<String>,
    issuetype: Option<Named>,
    priority: Option<Named>,
    #[serde(default)]
    created: String,
    #[serde(default)]
    updated: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraStatus {
    status_category: Option<StatusCategory>,
}

#[derive(Debug, Deserialize)]
struct StatusCategory {
    key: String,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Debug, Deserialize)]
struct Transitions {
    #[serde(default, deserialize_with = "null_as_default")]
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
struct Transition {
    id: String,
    to: Option<JiraStatus>,
}

impl Transition {
    fn target_category(&self) -> Option<&str> {
        self.to.as_ref()?.status_category.as_ref().map(|c| c.key.as_str())
    }
}

impl From<JiraIssue> for RemoteIssue {
    fn from(issue: JiraIssue) -> Self {
        let fields = issue.fields;
        Self {
            id: issue.key,
            title: fields.summary,
            body: fields.description.map(|doc| doc.to_text()).unwrap_or_default(),
            state: fields
                .status
                .and_then(|status| status.status_category)
                .map(|category| category.key)
                .unwrap_or_default(),
            labels: fields.labels,
            issue_type: fields.issuetype.map(|t| t.name),
            priority: fields.priority.map(|p| p.name),
            created_at: parse_timestamp(&fields.created),
            updated_at: parse_timestamp(&fields.updated),
        }
    }
}

/// Parses a Jira timestamp (`2025-01-02T15:04:05.000+0000`). Values that
/// match none of the accepted layouts become the Unix epoch.
#[must_use]
pub fn parse_timestamp(value: &str) -> DateTime<Utc> {
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.3f%z") {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.3fZ") {
        return parsed.and_utc();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Utc);
    }
    if !value.is_empty() {
        warn!(provider = PROVIDER_ID, value, "unparseable timestamp");
    }
    DateTime::<Utc>::default()
}

/// Issues of one Jira Cloud project.
pub struct JiraProvider {
    client: Client,
    config: JiraConfig,
}

impl JiraProvider {
    /// Creates a provider for `config`. Settings are validated by
    /// [`Provider::available`], not here.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: JiraConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| SyncError::Transport {
                operation: "jira client setup".into(),
                source,
            })?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API}{path}", self.config.url.trim_end_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header("Accept", "application/json")
    }

    /// Sends `request` and returns the response body of a 2xx reply.
    async fn send(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<String, SyncError> {
        debug!(provider = PROVIDER_ID, method, url, "jira request");
        let transport = |source: reqwest::Error| SyncError::Transport {
            operation: format!("{method} {url}"),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(SyncError::Http {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SyncError> {
        let url = self.url(path);
        let body = self.send("GET", &url, self.request(Method::GET, &url).query(query)).await?;
        serde_json::from_str(&body)
            .map_err(|source| SyncError::Parse { what: format!("response of GET {url}"), source })
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        payload: &Value,
    ) -> Result<String, SyncError> {
        let url = self.url(path);
        let name = if method == Method::PUT { "PUT" } else { "POST" };
        self.send(name, &url, self.request(method, &url).json(payload)).await
    }

    fn issue_fields(&self, issue: &RemoteIssue, with_project: bool) -> Value {
        let description = if issue.body.trim().is_empty() {
            Value::Null
        } else {
            json!(DocNode::from_text(&issue.body))
        };
        let mut fields = json!({
            "summary": issue.title,
            "description": description,
            "labels": issue.labels,
        });
        if with_project {
            fields["project"] = json!({ "key": self.config.project_key });
        }
        if let Some(name) = &issue.issue_type {
            fields["issuetype"] = json!({ "name": name });
        }
        if let Some(name) = &issue.priority {
            fields["priority"] = json!({ "name": name });
        }
        json!({ "fields": fields })
    }

    /// Moves `key` through the first transition that lands in `category`.
    async fn transition(&self, key: &str, category: &'static str) -> Result<(), SyncError> {
        let path = format!("/issue/{key}/transitions");
        let available: Transitions = self.get_json(&path, &[]).await?;
        let transition = available
            .transitions
            .iter()
            .find(|t| t.target_category().is_some_and(|c| c.eq_ignore_ascii_case(category)))
            .ok_or_else(|| SyncError::NoTransition { issue: key.to_string(), category })?;
        debug!(
            provider = PROVIDER_ID,
            issue = key,
            transition = %transition.id,
            category,
            "transition"
        );
        let payload = json!({ "transition": { "id": transition.id } });
        self.send_json(Method::POST, &path, &payload).await.map(drop)
    }
}

impl Provider for JiraProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "Jira"
    }

    fn available<'a>(&'a self, _work_dir: &'a Path) -> ProviderFuture<'a, bool> {
        Box::pin(async move {
            let missing = self.config.missing();
            if !missing.is_empty() {
                return Err(SyncError::NotConfigured {
                    provider: PROVIDER_ID,
                    reason: format!("missing {}", missing.join(", ")),
                });
            }
            let _: Value = self.get_json("/myself", &[]).await?;
            Ok(true)
        })
    }

    fn list<'a>(&'a self, _work_dir: &'a Path) -> ProviderFuture<'a, Vec<RemoteIssue>> {
        Box::pin(async move {
            let jql = format!("project={} ORDER BY updated DESC", self.config.project_key);
            let mut issues = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let mut query = vec![
                    ("jql", jql.as_str()),
                    ("maxResults", PAGE_SIZE),
                    ("fields", SEARCH_FIELDS),
                ];
                if let Some(token) = token.as_deref() {
                    query.push(("nextPageToken", token));
                }
                let page: SearchPage = self.get_json("/search/jql", &query).await?;
                debug!(provider = PROVIDER_ID, count = page.issues.len(), "fetched search page");
                issues.extend(page.issues.into_iter().map(RemoteIssue::from));
                // `isLast` is not trusted; only an empty token ends the listing.
                token = page.next_page_token.filter(|t| !t.is_empty());
                if token.is_none() {
                    break;
                }
            }
            Ok(issues)
        })
    }

    fn create<'a>(
        &'a self,
        _work_dir: &'a Path,
        issue: &'a RemoteIssue,
    ) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            let payload = self.issue_fields(issue, true);
            let body = self.send_json(Method::POST, "/issue", &payload).await?;
            let created: CreatedIssue = serde_json::from_str(&body).map_err(|source| {
                SyncError::Parse { what: "Jira create response".into(), source }
            })?;
            Ok(created.key)
        })
    }

    fn update<'a>(
        &'a self,
        _work_dir: &'a Path,
        external_id: &'a str,
        issue: &'a RemoteIssue,
    ) -> ProviderFuture<'a, ()> {
        Box::pin(async move {
            let payload = self.issue_fields(issue, false);
            self.send_json(Method::PUT, &format!("/issue/{external_id}"), &payload).await.map(drop)
        })
    }

    fn close<'a>(&'a self, _work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(self.transition(external_id, CATEGORY_DONE))
    }

    fn reopen<'a>(&'a self, _work_dir: &'a Path, external_id: &'a str) -> ProviderFuture<'a, ()> {
        Box::pin(self.transition(external_id, CATEGORY_NEW))
    }
}
