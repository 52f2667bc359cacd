use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    entities::{
        issue::{Category, Issue, Status},
        stats::IssueStats,
    },
    error,
};

use super::{parse_response, ServiceRequest};

/// Body of `POST /api/issues`. Fields are optional so that a missing field
/// is reported as a validation error instead of a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IssueQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Case-insensitive substring of the title or description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SuggestRequest {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SuggestResponse {
    pub category: Category,
}

/// Typed HTTP client for the issues service.
#[derive(Clone)]
pub struct IssuesClient {
    client: reqwest::Client,
    base_url: String,
}

impl IssuesClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list(&self, query: &IssueQuery) -> error::Result<Vec<Issue>> {
        let response = ServiceRequest::<()>::new(&self.client)
            .get(self.url("/api/issues"))
            .query("category", query.category.as_deref())
            .query("status", query.status.as_deref())
            .query("search", query.search.as_deref())
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn create(&self, issue: &CreateIssue) -> error::Result<Issue> {
        let response = ServiceRequest::new(&self.client)
            .post(self.url("/api/issues"))
            .json(issue)
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn update_status(&self, id: &str, status: Status) -> error::Result<Issue> {
        let change = StatusChange {
            status: Some(status.to_string()),
        };
        let response = ServiceRequest::new(&self.client)
            .patch(self.url(&format!("/api/issues/{}", id)))
            .json(&change)
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn stats(&self) -> error::Result<IssueStats> {
        let response = ServiceRequest::<()>::new(&self.client)
            .get(self.url("/api/stats"))
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn suggest_category(&self, text: &str) -> error::Result<Category> {
        let request = SuggestRequest {
            text: Some(text.to_string()),
        };
        let response = ServiceRequest::new(&self.client)
            .post(self.url("/api/ai-suggest"))
            .json(&request)
            .send()
            .await?;
        Ok(parse_response::<SuggestResponse>(response).await?.category)
    }
}
