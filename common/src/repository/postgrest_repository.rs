//! Repository over a hosted PostgREST endpoint (e.g. Supabase).
//!
//! Every call is a single HTTP request against `{url}/rest/v1/{table}`,
//! authenticated with the project access key.

use std::marker::PhantomData;

use anyhow::{bail, Context};
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{skip_unreadable, Entity, Filter, Query, Repository};

pub struct PostgrestRepository<T> {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    _t: PhantomData<fn() -> T>,
}

impl<T> PostgrestRepository<T> {
    pub fn new(client: reqwest::Client, url: &str, key: &str, table: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/rest/v1/{}", url.trim_end_matches('/'), table),
            key: key.to_string(),
            _t: PhantomData,
        }
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

fn param_value(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

/// Double-quoted PostgREST operand, so `,` `(` `)` in the value stay literal.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `imatch` operand matching `pattern` literally anywhere in the field.
/// `like` operands are avoided because PostgREST turns `*` into `%` there.
fn imatch_operand(pattern: &str) -> String {
    quoted(&regex::escape(pattern))
}

pub(crate) fn query_params<T: Entity>(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        match filter {
            Filter::Eq { field, value } => {
                params.push((field.clone(), format!("eq.{}", param_value(value))));
            }
            Filter::Contains { fields, pattern } => {
                let operand = imatch_operand(pattern);
                let alternatives = fields
                    .iter()
                    .map(|field| format!("{}.imatch.{}", field, operand))
                    .collect::<Vec<_>>()
                    .join(",");
                params.push(("or".to_string(), format!("({})", alternatives)));
            }
        }
    }

    if query.newest_first {
        params.push(("order".to_string(), format!("{}.desc", T::TIMESTAMP_FIELD)));
    }

    params
}

async fn rows(response: Response) -> anyhow::Result<Vec<Value>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Store responded with {}: {}", status, body);
    }
    response
        .json::<Vec<Value>>()
        .await
        .context("Malformed store response")
}

fn first<T: DeserializeOwned>(rows: Vec<Value>) -> anyhow::Result<Option<T>> {
    rows.into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()
        .context("Malformed store row")
}

#[async_trait]
impl<T> Repository<T> for PostgrestRepository<T>
where
    T: Entity + Serialize + DeserializeOwned + Send + Sync,
{
    async fn insert(&self, item: &T) -> anyhow::Result<T> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(item)
            .send()
            .await?;

        first(rows(response).await?)?.context("Store returned no row for insert")
    }

    async fn find(&self, field: &str, value: &Bson) -> anyhow::Result<Option<T>> {
        let response = self
            .request(Method::GET)
            .query(&[
                ("select", "*".to_string()),
                (field, format!("eq.{}", param_value(value))),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        first(rows(response).await?)
    }

    async fn find_many(&self, query: &Query) -> anyhow::Result<Vec<T>> {
        let response = self
            .request(Method::GET)
            .query(&query_params::<T>(query))
            .send()
            .await?;

        Ok(skip_unreadable(
            rows(response).await?.into_iter().map(serde_json::from_value::<T>),
        ))
    }

    async fn update(
        &self,
        field: &str,
        value: &Bson,
        change: Document,
    ) -> anyhow::Result<Option<T>> {
        let response = self
            .request(Method::PATCH)
            .header("Prefer", "return=representation")
            .query(&[(field, format!("eq.{}", param_value(value)))])
            .json(&change)
            .send()
            .await?;

        first(rows(response).await?)
    }
}
