pub mod issues;

use anyhow::anyhow;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{self, AddCode, ErrorBody};

pub struct ServiceRequest<'a, 'b, T = ()> {
    client: &'a reqwest::Client,
    method: reqwest::Method,
    url: Option<String>,
    query: Vec<(&'static str, String)>,
    body: Option<&'b T>,
}

impl<'a, 'b, T: Serialize> ServiceRequest<'a, 'b, T> {
    pub fn new(client: &'a reqwest::Client) -> Self {
        Self {
            client,
            method: reqwest::Method::GET,
            url: None,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    pub fn post(mut self, url: String) -> Self {
        self.url = Some(url);
        self.method = reqwest::Method::POST;
        self
    }

    pub fn patch(mut self, url: String) -> Self {
        self.url = Some(url);
        self.method = reqwest::Method::PATCH;
        self
    }

    pub fn query(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.query.push((key, value.to_string()));
        }
        self
    }

    pub fn json(mut self, body: &'b T) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(self) -> error::Result<reqwest::Response> {
        let Some(url) = self.url else {
            return Err(anyhow!("Request url is not set").into());
        };
        let mut request = self.client.request(self.method, url);
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        if let Some(body) = self.body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Ok(response)
    }
}

/// Decodes a success body, or turns an `{error}` body into a `ServiceError`
/// carrying the response status.
pub async fn parse_response<R: DeserializeOwned>(response: reqwest::Response) -> error::Result<R> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<R>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(anyhow!(message).code(status.as_u16()))
}
