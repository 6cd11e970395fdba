use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::common::{
    AuthError, AuthFailure, Credential, FeedPage, FetchError, FetchFailure, LoginError, Post,
    ValidationError,
};
use crate::config::AppConfig;
use crate::feed::FeedSource;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_EXPIRES_IN_MINS: u32 = 60;

/// Identity of a request for de-duplication: operation name plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    operation: &'static str,
    params: String,
}

impl RequestKey {
    fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            operation: "getPosts",
            params: format!("page={page_number}&size={page_size}"),
        }
    }
}

type PageRequest = Shared<BoxFuture<'static, Result<FeedPage, FetchError>>>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    expires_in_mins: u32,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct PostsResponse {
    posts: Vec<Post>,
}

/// Client for the login and posts endpoints.
///
/// Page requests are keyed by [`RequestKey`]: concurrent callers asking for
/// the same page share one HTTP request, and successful pages stay cached
/// until [`ApiClient::invalidate_pages`] or until the feed reports the page
/// as merged. Failed requests are evicted so a retry goes back to the
/// network. Nothing is retried automatically.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    auth_base: Url,
    posts_base: Url,
    timeout: Option<Duration>,
    pages: Arc<Mutex<HashMap<RequestKey, PageRequest>>>,
}

impl ApiClient {
    pub fn new(auth_base: &str, posts_base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            http: reqwest::Client::new(),
            auth_base: base_url(auth_base)?,
            posts_base: base_url(posts_base)?,
            timeout: None,
            pages: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, url::ParseError> {
        Ok(Self::new(&config.auth_base_url, &config.posts_base_url)?
            .with_timeout(config.request_timeout()))
    }

    /// Requests that do not finish within `timeout` fail with a `Timeout` reason.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        expires_in_mins: Option<u32>,
    ) -> Result<Credential, LoginError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingCredentials.into());
        }

        let url = self
            .auth_base
            .join("auth/login")
            .map_err(|err| AuthError::new(AuthFailure::Network, Some(err.to_string())))?;
        let body = LoginRequest {
            username,
            password,
            expires_in_mins: expires_in_mins
                .filter(|mins| *mins > 0)
                .unwrap_or(DEFAULT_EXPIRES_IN_MINS),
        };

        log::debug!("POST {url} for {username}");
        let attempt = async {
            let response = self
                .http
                .post(url)
                .json(&body)
                .send()
                .await
                .map_err(login_transport_error)?;
            read_login_response(response).await
        };

        match within(self.timeout, attempt).await {
            Some(result) => Ok(result?),
            None => {
                log::warn!("Login for {username} timed out");
                Err(AuthError::new(AuthFailure::Timeout, None).into())
            }
        }
    }

    /// Page numbers start at 1; page 0 is treated as page 1.
    pub async fn fetch_page(&self, page_number: u32, page_size: u32) -> Result<FeedPage, FetchError> {
        let key = RequestKey::page(page_number, page_size);
        let request = {
            let mut pages = self.pages.lock();
            pages
                .entry(key.clone())
                .or_insert_with(|| self.page_request(page_number, page_size).boxed().shared())
                .clone()
        };

        let result = request.clone().await;
        if result.is_err() {
            let mut pages = self.pages.lock();
            if pages.get(&key).is_some_and(|current| current.ptr_eq(&request)) {
                pages.remove(&key);
            }
        }
        result
    }

    pub fn invalidate_pages(&self) {
        self.pages.lock().clear();
    }

    /// Drops a settled page from the cache. A request still in flight is kept
    /// so callers waiting on it keep sharing it.
    pub fn forget_page(&self, page_number: u32, page_size: u32) {
        let key = RequestKey::page(page_number, page_size);
        let mut pages = self.pages.lock();
        if pages.get(&key).is_some_and(|request| request.peek().is_some()) {
            pages.remove(&key);
        }
    }

    pub fn cached_pages(&self) -> usize {
        self.pages.lock().len()
    }

    fn page_request(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<FeedPage, FetchError>> + Send + 'static {
        let http = self.http.clone();
        let timeout = self.timeout;
        let url = self.posts_url(page_number, page_size);

        async move {
            let url = url.map_err(|err| {
                FetchError::new(page_number, FetchFailure::Network, err.to_string())
            })?;
            log::debug!("GET {url}");

            let attempt = async {
                let response = http
                    .get(url)
                    .send()
                    .await
                    .map_err(|err| fetch_transport_error(page_number, err))?;
                read_posts_response(page_number, response).await
            };

            match within(timeout, attempt).await {
                Some(result) => result,
                None => Err(FetchError::new(
                    page_number,
                    FetchFailure::Timeout,
                    "request deadline elapsed",
                )),
            }
        }
    }

    fn posts_url(&self, page_number: u32, page_size: u32) -> Result<Url, url::ParseError> {
        let skip = u64::from(page_number.saturating_sub(1)) * u64::from(page_size);
        let mut url = self.posts_base.join("posts")?;
        url.query_pairs_mut()
            .append_pair("limit", &page_size.to_string())
            .append_pair("skip", &skip.to_string());
        Ok(url)
    }
}

#[async_trait]
impl FeedSource for ApiClient {
    async fn fetch_page(&self, page_number: u32, page_size: u32) -> Result<FeedPage, FetchError> {
        ApiClient::fetch_page(self, page_number, page_size).await
    }

    fn forget_page(&self, page_number: u32, page_size: u32) {
        ApiClient::forget_page(self, page_number, page_size);
    }

    fn invalidate(&self) {
        self.invalidate_pages();
    }
}

/// Parses a base URL so that relative joins append to its path.
fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn within<F: Future>(limit: Option<Duration>, future: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future).await.ok(),
        None => Some(future.await),
    }
}

async fn read_login_response(response: Response) -> Result<Credential, AuthError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<Credential>().await.map_err(|err| {
            log::warn!("Malformed login response: {err}");
            AuthError::new(AuthFailure::Server, None)
        });
    }

    let message = error_message(response).await;
    let reason = if status.is_client_error() {
        AuthFailure::InvalidCredentials
    } else {
        AuthFailure::Server
    };
    log::warn!("Login rejected with {status}");
    Err(AuthError::new(reason, message))
}

async fn read_posts_response(page_number: u32, response: Response) -> Result<FeedPage, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let detail = error_message(response)
            .await
            .unwrap_or_else(|| status_detail(status));
        return Err(FetchError::new(page_number, FetchFailure::Server, detail));
    }

    let body = response
        .json::<PostsResponse>()
        .await
        .map_err(|err| FetchError::new(page_number, FetchFailure::Server, err.to_string()))?;
    Ok(FeedPage {
        page_number,
        items: body.posts,
    })
}

async fn error_message(response: Response) -> Option<String> {
    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
}

fn status_detail(status: StatusCode) -> String {
    format!("unexpected status {status}")
}

fn login_transport_error(err: reqwest::Error) -> AuthError {
    log::warn!("Login request failed: {err}");
    let reason = if err.is_timeout() {
        AuthFailure::Timeout
    } else {
        AuthFailure::Network
    };
    AuthError::new(reason, None)
}

fn fetch_transport_error(page_number: u32, err: reqwest::Error) -> FetchError {
    let reason = if err.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Network
    };
    FetchError::new(page_number, reason, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_url_maps_page_to_offset() {
        let client = ApiClient::new("https://dummyjson.com", "http://localhost:5173/api").unwrap();
        assert_eq!(
            client.posts_url(1, 10).unwrap().as_str(),
            "http://localhost:5173/api/posts?limit=10&skip=0"
        );
        assert_eq!(
            client.posts_url(3, 10).unwrap().as_str(),
            "http://localhost:5173/api/posts?limit=10&skip=20"
        );
        assert_eq!(
            client.posts_url(0, 5).unwrap().as_str(),
            "http://localhost:5173/api/posts?limit=5&skip=0"
        );
    }

    #[test]
    fn large_pages_do_not_overflow_the_offset() {
        let client = ApiClient::new("https://dummyjson.com", "https://dummyjson.com").unwrap();
        assert_eq!(
            client.posts_url(6, 1_000_000_000).unwrap().as_str(),
            "https://dummyjson.com/posts?limit=1000000000&skip=5000000000"
        );
        assert!(client
            .posts_url(u32::MAX, u32::MAX)
            .unwrap()
            .as_str()
            .ends_with("skip=18446744060824649730"));
    }

    #[test]
    fn login_url_keeps_base_path() {
        let client = ApiClient::new("http://localhost:5173/api", "https://dummyjson.com").unwrap();
        assert_eq!(
            client.auth_base.join("auth/login").unwrap().as_str(),
            "http://localhost:5173/api/auth/login"
        );
    }

    #[test]
    fn request_key_distinguishes_page_and_size() {
        assert_eq!(RequestKey::page(1, 10), RequestKey::page(1, 10));
        assert_ne!(RequestKey::page(1, 10), RequestKey::page(2, 10));
        assert_ne!(RequestKey::page(1, 10), RequestKey::page(1, 20));
    }
}
