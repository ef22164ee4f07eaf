//! HTTP request builder shared by every API call

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::error::{ApiError, Result};

/// Helper for building and executing a single JSON request
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: Url,
    method: Method,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    pub fn new(client: &'a Client, url: Url, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            url,
            method,
            headers,
            body: None,
        }
    }

    /// Append a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Set a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    fn build(self) -> RequestBuilder {
        let mut req = self.client.request(self.method, self.url).headers(self.headers);
        if let Some(body) = self.body {
            req = req.body(body);
        }
        req
    }

    /// Send the request and decode a JSON response.
    ///
    /// Non-success statuses become [`ApiError::Api`] with the body's `message`
    /// or the status text.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let method = self.method.clone();
        let url = self.url.to_string();
        let response = self.build().send().await?;
        let status = response.status();
        debug!("{} {} -> {}", method, url, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_body(status, &body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Entry points for each HTTP method the API uses
pub struct Fetch;

impl Fetch {
    pub fn get(client: &Client, url: Url) -> FetchBuilder<'_> {
        FetchBuilder::new(client, url, Method::GET)
    }

    pub fn post(client: &Client, url: Url) -> FetchBuilder<'_> {
        FetchBuilder::new(client, url, Method::POST)
    }

    pub fn patch(client: &Client, url: Url) -> FetchBuilder<'_> {
        FetchBuilder::new(client, url, Method::PATCH)
    }
}
