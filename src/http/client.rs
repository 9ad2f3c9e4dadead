//! HTTP client with Waldur status handling, conflict retry and pagination.

use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, LINK, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use super::link::next_link;
use super::retry::{Disposition, MAX_REDIRECTS, attempts_for, classify};
use crate::config::ClientConfig;
use crate::error::{Result, WaldurError};
use crate::query::Query;

/// Header carrying the total number of objects matching a list query.
pub const RESULT_COUNT_HEADER: &str = "X-Result-Count";

pub const OK: &[StatusCode] = &[StatusCode::OK];

/// A response whose status was accepted by the caller.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self {
            status,
            url,
            headers,
            body,
        })
    }

    /// Decodes the body as JSON; an empty body is `Value::Null`.
    pub fn json(&self) -> Result<Value> {
        decode_body(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// HTTP client preconfigured with Waldur authentication.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    conflict_retry_delay: Duration,
}

impl HttpClient {
    /// Builds the underlying reqwest client from the configuration.
    ///
    /// Redirects are never followed by reqwest; [`HttpClient::send`] follows
    /// them itself so that POST bodies survive the hop.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("token {}", config.access_token))
            .map_err(|_| WaldurError::InvalidHeader {
                name: AUTHORIZATION.to_string(),
                value: "access token contains characters not allowed in a header".to_string(),
            })?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(!config.verify_ssl);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if !config.verify_ssl {
            debug!("TLS certificate verification is disabled");
        }

        Ok(Self {
            client: builder.build()?,
            conflict_retry_delay: config.conflict_retry_delay,
        })
    }

    /// Sends a request and decodes the JSON body of an accepted response.
    ///
    /// GET gets a single attempt; other methods are retried on `409 Conflict`.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        valid: &[StatusCode],
        query: Option<&Query>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let attempts = attempts_for(&method);
        self.send(method, url, valid, query, body, attempts)
            .await?
            .json()
    }

    /// Sends a request, following redirects and retrying conflicts.
    ///
    /// Fails with `RetryLimit` once `attempts` conflicts were answered.
    #[tracing::instrument(skip(self, valid, query, body))]
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        valid: &[StatusCode],
        query: Option<&Query>,
        body: Option<&Value>,
        attempts: usize,
    ) -> Result<RawResponse> {
        let mut url = url.to_string();
        let mut attempts_left = attempts;
        let mut redirects = 0;
        let mut previous_body = String::new();

        loop {
            if attempts_left == 0 {
                return Err(WaldurError::RetryLimit {
                    method: method.to_string(),
                    url,
                    body: previous_body,
                });
            }

            debug!("{} {}", method, url);
            let mut request = self.client.request(method.clone(), &url);
            if let Some(query) = query.filter(|q| !q.is_empty()) {
                request = request.query(query.pairs());
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match classify(status, valid, location.as_deref()) {
                Disposition::Accept => return RawResponse::read(response).await,
                Disposition::Redirect(location) => {
                    redirects += 1;
                    if redirects > MAX_REDIRECTS {
                        return Err(rejection(response).await);
                    }
                    url = resolve_location(&url, &location)?;
                    debug!("Following redirect to {}", url);
                }
                Disposition::Conflict => {
                    previous_body = response.text().await.unwrap_or_default();
                    attempts_left -= 1;
                    warn!(
                        "{} {} answered 409 Conflict ({} attempts left), retrying in {:?}",
                        method, url, attempts_left, self.conflict_retry_delay
                    );
                    tokio::time::sleep(self.conflict_retry_delay).await;
                }
                Disposition::Reject => return Err(rejection(response).await),
            }
        }
    }

    /// Fetches every page of a list by following `rel="next"` links.
    ///
    /// Next links already embed the filters, so the query is only sent with
    /// the first request. A non-list first page is returned unchanged.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_all(&self, url: &str, query: Option<&Query>) -> Result<Value> {
        let mut page = self.send(Method::GET, url, OK, query, None, 1).await?;
        let mut result = page.json()?;

        let mut visited = vec![page.url.clone()];
        while let Some(next) = page.header(LINK.as_str()).and_then(next_link) {
            let Value::Array(items) = &mut result else {
                break;
            };
            if visited.contains(&next) {
                warn!("Pagination loop detected at {}, stopping", next);
                break;
            }
            debug!("Fetching next page {}", next);
            page = self.send(Method::GET, &next, OK, None, None, 1).await?;
            visited.push(page.url.clone());
            match page.json()? {
                Value::Array(more) => items.extend(more),
                Value::Null => {}
                other => items.push(other),
            }
        }

        Ok(result)
    }

    /// Counts matching objects with a HEAD request.
    #[tracing::instrument(skip(self, query))]
    pub async fn count(&self, url: &str, query: Option<&Query>) -> Result<u64> {
        let attempts = attempts_for(&Method::HEAD);
        let response = self.send(Method::HEAD, url, OK, query, None, attempts).await?;
        let value = response.header(RESULT_COUNT_HEADER).unwrap_or_default();
        value.trim().parse().map_err(|_| WaldurError::InvalidHeader {
            name: RESULT_COUNT_HEADER.to_string(),
            value: value.to_string(),
        })
    }
}

fn decode_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

fn resolve_location(current: &str, location: &str) -> Result<String> {
    let base = url::Url::parse(current)?;
    Ok(base.join(location)?.to_string())
}

async fn rejection(response: reqwest::Response) -> WaldurError {
    let status = response.status();
    let url = response.url().to_string();
    let mut reason = status.canonical_reason().unwrap_or("Unknown").to_string();
    if let Ok(text) = response.text().await {
        if let Ok(details) = serde_json::from_str::<Value>(&text) {
            reason = format!("{}. {}", reason, details);
        }
    }
    WaldurError::Rejected {
        url,
        status,
        reason,
    }
}
