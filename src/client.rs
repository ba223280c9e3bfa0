use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::{HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Client as HyperClient, Method, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::{Host, Url};

use std::fmt;
use std::sync::Arc;

use crate::api::ApiRequest;
use crate::store::SessionStore;

const API_BASE: &str = "/api/";
const REQUEST_FAILED: &str = "Request failed";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("invalid request: {0}")]
    Http(#[from] hyper::http::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("server URL must use https")]
    InvalidUrl,
    /// Any non-2xx response other than an intercepted 401.
    #[error("{message}")]
    Response { status: u16, message: String },
    /// A 401 outside of sign-in; the session has already been cleared.
    #[error("session expired")]
    SessionExpired,
    #[error("Failed to create post")]
    CreationFailed,
    #[error("Failed to toggle vote")]
    VoteFailed,
    #[error("Failed to add comment")]
    CommentFailed,
    #[error("Failed to update status")]
    StatusUpdateFailed,
    #[error("Failed to create board")]
    BoardCreationFailed,
    #[error("Authentication returned no session")]
    AuthFailed,
}

impl Error {
    /// True when the server accepted the request but returned no entity.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            Error::CreationFailed
                | Error::VoteFailed
                | Error::CommentFailed
                | Error::StatusUpdateFailed
                | Error::BoardCreationFailed
                | Error::AuthFailed
        )
    }
}

/// Sends API requests on behalf of the stores.
///
/// Resolves to `None` when the server answered successfully without an
/// entity (204, an empty body, or JSON `null`).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>>;
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone)]
struct HttpClient {
    base_url: Url,
    hyper: HyperClient<HttpsConnector<HttpConnector>, Body>,
}

/// HTTP transport that authorizes requests with the current session token.
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    session: Arc<SessionStore>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FeedbackClient({})", self.http.base_url)
    }
}

impl HttpClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Bytes)> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        debug!(%method, url = url.as_str(), "sending request");

        let mut request = Request::builder()
            .method(method)
            .uri(url.as_str())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", token))?;
            request = request.header(AUTHORIZATION, bearer);
        }
        let body = match body {
            Some(body) => Body::from(serde_json::to_vec(body)?),
            None => Body::empty(),
        };

        let response = self.hyper.request(request.body(body)?).await?;
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await?;
        debug!(status = status.as_u16(), len = bytes.len(), "received response");
        Ok((status, bytes))
    }
}

impl Client {
    /// `url` is the server root; the API base path is appended here.
    ///
    /// Plain http is only accepted for loopback development servers.
    pub fn new(url: Url, session: Arc<SessionStore>) -> Result<Self> {
        if url.scheme() != "https" && !(url.scheme() == "http" && is_loopback(&url)) {
            return Err(Error::InvalidUrl);
        }

        let url = url.join(API_BASE)?;

        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client: HyperClient<_, Body> = HyperClient::builder().build(https);

        Ok(Client {
            http: HttpClient {
                base_url: url,
                hyper: client,
            },
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.http.base_url
    }
}

#[async_trait]
impl Transport for Client {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>> {
        let token = self.session.token();
        let (status, bytes) = self
            .http
            .request(
                request.method.clone(),
                &request.path,
                token.as_deref(),
                request.body.as_ref(),
            )
            .await?;

        if status == StatusCode::UNAUTHORIZED && !request.skip_auth_redirect {
            warn!(path = request.path.as_str(), "session expired, signing out");
            self.session.logout();
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| REQUEST_FAILED.to_string());
            return Err(Error::Response {
                status: status.as_u16(),
                message,
            });
        }

        decode_body(status, &bytes)
    }
}

fn decode_body(status: StatusCode, bytes: &[u8]) -> Result<Option<Value>> {
    if status == StatusCode::NO_CONTENT || bytes.is_empty() {
        return Ok(None);
    }

    match serde_json::from_slice(bytes)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost",
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> Arc<SessionStore> {
        Arc::new(SessionStore::new())
    }

    #[tokio::test]
    async fn rejects_plain_http_for_remote_hosts() {
        let url = Url::parse("http://feedback.example.com").unwrap();
        assert!(matches!(Client::new(url, session()), Err(Error::InvalidUrl)));
    }

    #[tokio::test]
    async fn appends_api_base() {
        let url = Url::parse("https://feedback.example.com").unwrap();
        let client = Client::new(url, session()).unwrap();
        assert_eq!(client.base_url().as_str(), "https://feedback.example.com/api/");
    }

    #[tokio::test]
    async fn allows_loopback_http() {
        let url = Url::parse("http://127.0.0.1:8080").unwrap();
        assert!(Client::new(url, session()).is_ok());
    }

    #[tokio::test]
    async fn unusable_token_is_rejected_before_sending() {
        let session = session();
        let user = crate::user::User {
            id: crate::user::UserId::new("u1"),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            avatar_url: None,
            created_at: None,
        };
        session.set_auth("line\nbreak", user);
        let url = Url::parse("http://127.0.0.1:9").unwrap();
        let client = Client::new(url, session).unwrap();

        let err = client
            .send(ApiRequest {
                method: Method::GET,
                path: "/health".to_string(),
                body: None,
                skip_auth_redirect: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn no_content_and_null_are_empty() {
        assert!(decode_body(StatusCode::NO_CONTENT, b"").unwrap().is_none());
        assert!(decode_body(StatusCode::OK, b"").unwrap().is_none());
        assert!(decode_body(StatusCode::OK, b"null").unwrap().is_none());
        assert_eq!(
            decode_body(StatusCode::OK, b"{\"voted\":true}").unwrap(),
            Some(json!({"voted": true}))
        );
    }

    #[test]
    fn empty_result_errors() {
        assert!(Error::VoteFailed.is_empty_result());
        assert!(!Error::SessionExpired.is_empty_result());
        let error = Error::Response {
            status: 422,
            message: "Title is required".to_string(),
        };
        assert_eq!(error.to_string(), "Title is required");
    }
}
