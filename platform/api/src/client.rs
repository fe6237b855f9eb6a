use std::{fmt, marker::PhantomData, time::Duration, time::Instant};

use entity::RecordId;
use reqwest::{
    Method, Response, Url,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{ApiError, ApiResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Connection to one record store. Cheap to clone.
#[derive(Clone)]
pub struct RecordStoreClient {
    http: reqwest::Client,
    base_url: Url,
}

impl fmt::Debug for RecordStoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStoreClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl RecordStoreClient {
    pub fn new(config: &StoreConfig) -> ApiResult<Self> {
        let mut base_url = Url::parse(config.base_url.trim())
            .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Typed handle on one collection, e.g. `client.collection::<User>("users")`.
    pub fn collection<T>(&self, name: &'static str) -> Collection<T> {
        Collection {
            client: self.clone(),
            name,
            _record: PhantomData,
        }
    }

    /// Appends each segment percent-encoded, so `/`, `?` and `#` inside a
    /// segment stay in that segment.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidId((*bad).to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The part of `url` below the base, as it appears in logs and errors.
    fn display_path(&self, url: &Url) -> String {
        let path = url.path();
        path.strip_prefix(self.base_url.path())
            .unwrap_or(path)
            .to_string()
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ApiResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let path = self.display_path(&url);
        let path = path.as_str();
        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|source| {
            if source.is_timeout() {
                warn!(%method, path, "record store request timed out");
                ApiError::Timeout {
                    method: method.clone(),
                    path: path.to_string(),
                }
            } else {
                warn!(%method, path, error = %source, "record store request failed");
                ApiError::Transport {
                    method: method.clone(),
                    path: path.to_string(),
                    source,
                }
            }
        })?;

        let status = response.status();
        debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "record store responded"
        );
        if !status.is_success() {
            return Err(ApiError::Status {
                method,
                path: path.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn fetch<B, R>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let path = self.display_path(&url);
        let response = self.execute(method, url, query, body).await?;
        response
            .json::<R>()
            .await
            .map_err(|source| ApiError::Decode { path, source })
    }
}

/// CRUD verbs over a single collection of `T` documents.
pub struct Collection<T> {
    client: RecordStoreClient,
    name: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            name: self.name,
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("client", &self.client)
            .finish()
    }
}

impl<T: DeserializeOwned> Collection<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn collection_url(&self) -> ApiResult<Url> {
        self.client.url(&[self.name])
    }

    fn item_url(&self, id: &RecordId) -> ApiResult<Url> {
        let key = id.as_key();
        self.client.url(&[self.name, key.as_ref()])
    }

    /// `GET /<collection>`
    pub async fn list(&self) -> ApiResult<Vec<T>> {
        self.client
            .fetch(Method::GET, self.collection_url()?, &[], None::<&()>)
            .await
    }

    /// `GET /<collection>?field=value&...`, equality matches only.
    pub async fn find_by(&self, filters: &[(&str, &str)]) -> ApiResult<Vec<T>> {
        self.client
            .fetch(Method::GET, self.collection_url()?, filters, None::<&()>)
            .await
    }

    /// `GET /<collection>/:id`
    pub async fn get(&self, id: &RecordId) -> ApiResult<T> {
        self.client
            .fetch(Method::GET, self.item_url(id)?, &[], None::<&()>)
            .await
    }

    /// `POST /<collection>`; the store assigns the id.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> ApiResult<T> {
        self.client
            .fetch(Method::POST, self.collection_url()?, &[], Some(body))
            .await
    }

    /// `PUT /<collection>/:id`, full replacement.
    pub async fn replace<B: Serialize + ?Sized>(&self, id: &RecordId, body: &B) -> ApiResult<T> {
        self.client
            .fetch(Method::PUT, self.item_url(id)?, &[], Some(body))
            .await
    }

    /// `PATCH /<collection>/:id`, only the supplied fields change.
    pub async fn patch<B: Serialize + ?Sized>(&self, id: &RecordId, body: &B) -> ApiResult<T> {
        self.client
            .fetch(Method::PATCH, self.item_url(id)?, &[], Some(body))
            .await
    }

    /// `DELETE /<collection>/:id`; the response body is ignored.
    pub async fn delete(&self, id: &RecordId) -> ApiResult<()> {
        self.client
            .execute(Method::DELETE, self.item_url(id)?, &[], None::<&()>)
            .await?;
        Ok(())
    }
}
