//! Waldur API client.
//!
//! [`WaldurClient`] holds the generic building blocks (URL construction,
//! lookups, CRUD, polling). Resource operations live in the submodules.

mod billing;
mod marketplace;
mod openstack;
mod slurm;
mod structure;
mod support;

use log::debug;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::time::{Instant, sleep};
use url::Url;

use crate::config::ClientConfig;
use crate::endpoints::Endpoint;
use crate::error::{Result, WaldurError};
use crate::http::{HttpClient, OK};
use crate::identifier::{Identifier, is_uuid};
use crate::models::{Resource, WaitOptions};
use crate::query::Query;

/// How many objects a lookup may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Exactly one; several is an error.
    Single,
    /// The first of possibly several.
    First,
    /// All of them, as a list.
    All,
}

pub(crate) const ACCEPTED: &[StatusCode] = &[StatusCode::ACCEPTED];
pub(crate) const CREATED: &[StatusCode] = &[StatusCode::CREATED];
pub(crate) const DELETED: &[StatusCode] = &[StatusCode::ACCEPTED, StatusCode::NO_CONTENT];

#[derive(Clone)]
pub struct WaldurClient {
    api_url: Url,
    http: HttpClient,
    page_size: u32,
}

impl WaldurClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api_url = Url::parse(&ensure_trailing_slash(&config.api_url))?;
        let http = HttpClient::new(&config)?;
        Ok(Self {
            api_url,
            http,
            page_size: config.page_size,
        })
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Resolves a path against the API root. The result ends with a slash.
    ///
    /// Absolute URLs are kept as they are.
    pub fn build_url(&self, path: &str) -> Result<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(ensure_trailing_slash(path));
        }
        let relative = ensure_trailing_slash(path.trim_start_matches('/'));
        Ok(self.api_url.join(&relative)?.to_string())
    }

    /// `endpoint/id/` or `endpoint/id/action/`.
    pub fn build_resource_url(
        &self,
        endpoint: impl AsRef<str>,
        id: &str,
        action: Option<&str>,
    ) -> Result<String> {
        if id.is_empty() {
            return Err(WaldurError::EmptyIdentifier);
        }
        let mut path = format!("{}/{}", endpoint.as_ref(), id);
        if let Some(action) = action {
            path.push('/');
            path.push_str(action);
        }
        self.build_url(&path)
    }

    /// `endpoint/id/sub_endpoint/sub_id/`.
    pub fn build_nested_resource_url(
        &self,
        endpoint: impl AsRef<str>,
        id: &str,
        sub_endpoint: &str,
        sub_id: &str,
    ) -> Result<String> {
        if id.is_empty() || sub_id.is_empty() {
            return Err(WaldurError::EmptyIdentifier);
        }
        self.build_url(&format!(
            "{}/{}/{}/{}",
            endpoint.as_ref(),
            id,
            sub_endpoint,
            sub_id
        ))
    }

    pub(crate) async fn get_url(&self, url: &str, query: Option<&Query>) -> Result<Resource> {
        self.http.request(Method::GET, url, OK, query, None).await
    }

    pub(crate) async fn post_url(
        &self,
        url: &str,
        valid: &[StatusCode],
        body: Option<&Value>,
    ) -> Result<Resource> {
        self.http.request(Method::POST, url, valid, None, body).await
    }

    /// Looks up one object by UUID, or by exact name otherwise.
    pub async fn get_resource(
        &self,
        endpoint: impl AsRef<str>,
        id: &str,
        extra: Option<Query>,
    ) -> Result<Resource> {
        if id.is_empty() {
            return Err(WaldurError::EmptyIdentifier);
        }
        let mut query = if is_uuid(id) {
            Query::new().with("uuid", id)
        } else {
            Query::new().with("name_exact", id)
        };
        if let Some(extra) = extra {
            query.extend(extra);
        }
        self.query_resource(endpoint, query, QueryMode::Single).await
    }

    pub(crate) async fn query_resource_by_uuid(
        &self,
        endpoint: impl AsRef<str>,
        uuid: &str,
    ) -> Result<Resource> {
        self.query_resource(endpoint, Query::new().with("uuid", uuid), QueryMode::Single)
            .await
    }

    /// Looks up a name-or-UUID under the given filter, e.g. `tenant_uuid`.
    pub(crate) async fn get_scoped_resource(
        &self,
        endpoint: impl AsRef<str>,
        id: &str,
        scope: Query,
    ) -> Result<Resource> {
        let key = if is_uuid(id) { "uuid" } else { "name_exact" };
        let mut query = scope;
        query.push(key, id);
        self.query_resource(endpoint, query, QueryMode::Single).await
    }

    /// Runs a filtered GET. A `uuid` parameter is moved into the path.
    #[tracing::instrument(skip(self, endpoint), fields(endpoint = endpoint.as_ref()))]
    pub async fn query_resource(
        &self,
        endpoint: impl AsRef<str>,
        mut query: Query,
        mode: QueryMode,
    ) -> Result<Resource> {
        let mut url = self.build_url(endpoint.as_ref())?;
        if let Some(uuid) = query.take("uuid") {
            url.push_str(&uuid);
            url.push('/');
        }

        let result = self.get_url(&url, Some(&query)).await?;
        expect_result(result, &url, &query, mode)
    }

    /// Lists every object of a collection, page by page.
    #[tracing::instrument(skip(self, endpoint), fields(endpoint = endpoint.as_ref()))]
    pub async fn list(&self, endpoint: impl AsRef<str>, mut filters: Query) -> Result<Resource> {
        let url = self.build_url(endpoint.as_ref())?;
        filters.set_default("page_size", self.page_size);
        self.http.get_all(&url, Some(&filters)).await
    }

    /// Fetches a URL and every following page without adding a page size.
    pub(crate) async fn list_url(&self, url: &str) -> Result<Resource> {
        self.http.get_all(url, None).await
    }

    pub async fn count(&self, endpoint: impl AsRef<str>, filters: Query) -> Result<u64> {
        let url = self.build_url(endpoint.as_ref())?;
        self.http.count(&url, Some(&filters)).await
    }

    pub async fn create(
        &self,
        endpoint: impl AsRef<str>,
        payload: &Value,
        valid: &[StatusCode],
    ) -> Result<Resource> {
        let url = self.build_url(endpoint.as_ref())?;
        self.post_url(&url, valid, Some(payload)).await
    }

    pub async fn update(
        &self,
        endpoint: impl AsRef<str>,
        uuid: &str,
        payload: &Value,
    ) -> Result<Resource> {
        let url = self.build_resource_url(endpoint, uuid, None)?;
        self.http
            .request(Method::PUT, &url, OK, None, Some(payload))
            .await
    }

    pub async fn patch(
        &self,
        endpoint: impl AsRef<str>,
        uuid: &str,
        payload: &Value,
    ) -> Result<Resource> {
        let url = self.build_resource_url(endpoint, uuid, None)?;
        self.http
            .request(Method::PATCH, &url, OK, None, Some(payload))
            .await
    }

    pub async fn delete(&self, endpoint: impl AsRef<str>, uuid: &str) -> Result<Resource> {
        let url = self.build_resource_url(endpoint, uuid, None)?;
        self.delete_by_url(&url).await
    }

    pub async fn delete_by_url(&self, url: &str) -> Result<Resource> {
        self.http
            .request(Method::DELETE, url, DELETED, None, None)
            .await
    }

    /// Deletes an object given by UUID or by its URL.
    pub(crate) async fn delete_by_reference(
        &self,
        endpoint: Endpoint,
        reference: &str,
    ) -> Result<Resource> {
        match Identifier::classify(reference) {
            Identifier::Uuid(uuid) => self.delete(endpoint, uuid).await,
            Identifier::Url(url) => self.delete_by_url(url).await,
            Identifier::Name(name) => Err(WaldurError::Validation(format!(
                "Expected a UUID or URL of {}, got \"{}\"",
                endpoint, name
            ))),
        }
    }

    /// Runs an asynchronous action, answered with `202 Accepted`.
    pub async fn action(
        &self,
        endpoint: impl AsRef<str>,
        uuid: &str,
        action: &str,
        body: Option<&Value>,
    ) -> Result<Resource> {
        self.action_with_status(endpoint, uuid, action, ACCEPTED, body)
            .await
    }

    pub async fn action_with_status(
        &self,
        endpoint: impl AsRef<str>,
        uuid: &str,
        action: &str,
        valid: &[StatusCode],
        body: Option<&Value>,
    ) -> Result<Resource> {
        let url = self.build_resource_url(endpoint, uuid, Some(action))?;
        self.post_url(&url, valid, body).await
    }

    /// GET on a detail route such as `endpoint/uuid/team/`.
    pub async fn get_detail(
        &self,
        endpoint: impl AsRef<str>,
        uuid: &str,
        action: &str,
    ) -> Result<Resource> {
        let url = self.build_resource_url(endpoint, uuid, Some(action))?;
        self.get_url(&url, None).await
    }

    async fn is_resource_ready(&self, endpoint: &str, uuid: &str) -> Result<bool> {
        let resource = self.query_resource_by_uuid(endpoint, uuid).await?;
        let state = str_field(&resource, "state", endpoint)?;
        if state == "Erred" {
            return Err(WaldurError::InvalidState(
                "Resource is in erred state.".to_string(),
            ));
        }
        Ok(state == "OK")
    }

    /// Polls an object until its state is `OK`.
    #[tracing::instrument(skip(self, endpoint, options), fields(endpoint = endpoint.as_ref()))]
    pub async fn wait_for_resource(
        &self,
        endpoint: impl AsRef<str>,
        uuid: &str,
        options: &WaitOptions,
    ) -> Result<()> {
        let endpoint = endpoint.as_ref();
        let started = Instant::now();
        loop {
            if self.is_resource_ready(endpoint, uuid).await? {
                return Ok(());
            }
            if started.elapsed() >= options.timeout {
                return Err(WaldurError::Timeout(format!(
                    "Resource \"{}\" with id \"{}\" has not changed state to stable. Seconds passed: {}",
                    endpoint,
                    uuid,
                    options.timeout.as_secs()
                )));
            }
            debug!("{} {} is not ready yet", endpoint, uuid);
            sleep(options.interval).await;
        }
    }

    /// Polls an instance until it reports an external IP.
    pub async fn wait_for_external_ip(&self, uuid: &str, options: &WaitOptions) -> Result<()> {
        let started = Instant::now();
        loop {
            let instance = self
                .query_resource_by_uuid(Endpoint::OpenStackInstances, uuid)
                .await?;
            let has_ip = instance
                .get("external_ips")
                .and_then(Value::as_array)
                .is_some_and(|ips| !ips.is_empty());
            if has_ip {
                return Ok(());
            }
            if started.elapsed() >= options.timeout {
                return Err(WaldurError::Timeout(format!(
                    "Resource \"{}\" with id \"{}\" has not got external IP. Seconds passed: {}",
                    Endpoint::OpenStackInstances,
                    uuid,
                    options.timeout.as_secs()
                )));
            }
            sleep(options.interval).await;
        }
    }

    /// Polls an order until `field` names the created object.
    #[tracing::instrument(skip(self, options))]
    pub async fn resource_uuid_from_order(
        &self,
        order_uuid: &str,
        field: &str,
        options: &WaitOptions,
    ) -> Result<String> {
        let started = Instant::now();
        loop {
            let order = self.get_order(order_uuid).await?;
            if order.get("state").and_then(Value::as_str) == Some("erred") {
                let message = order
                    .get("error_message")
                    .and_then(Value::as_str)
                    .unwrap_or("Order is erred.");
                return Err(WaldurError::InvalidState(message.to_string()));
            }
            if let Some(uuid) = order.get(field).and_then(Value::as_str) {
                if !uuid.is_empty() {
                    return Ok(uuid.to_string());
                }
            }
            if started.elapsed() >= options.timeout {
                return Err(WaldurError::Timeout(format!(
                    "Resource reference has not been found from order item \"{}\". Seconds passed: {}",
                    order_uuid,
                    options.timeout.as_secs()
                )));
            }
            debug!("Order {} has no {} yet", order_uuid, field);
            sleep(options.interval).await;
        }
    }
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn expect_result(result: Value, url: &str, query: &Query, mode: QueryMode) -> Result<Resource> {
    if is_empty_result(&result) {
        return Err(WaldurError::ObjectDoesNotExist(format!(
            "Result is empty. Endpoint: {}. Query: {}",
            url, query
        )));
    }
    let mut items = match result {
        Value::Array(items) => items,
        other => return Ok(other),
    };
    match mode {
        QueryMode::All => Ok(Value::Array(items)),
        QueryMode::Single if items.len() > 1 => Err(WaldurError::MultipleObjectsReturned(
            format!("Ambiguous result. Endpoint: {}. Query: {}", url, query),
        )),
        QueryMode::Single | QueryMode::First => Ok(items.swap_remove(0)),
    }
}

/// Reads a string field the API always sends.
pub(crate) fn str_field<'a>(resource: &'a Value, field: &str, context: &str) -> Result<&'a str> {
    resource
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| WaldurError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        })
}
