//! Typed request helpers layered over a [`Transport`].

use hyper::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use std::fmt;
use std::sync::Arc;

use crate::client::{Result, Transport};

/// Bytes escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builds an absolute API path from raw segments, escaping each one so ids
/// and slugs can't change the shape of the URL.
pub(crate) fn path(segments: &[&str]) -> String {
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.extend(utf8_percent_encode(segment, SEGMENT));
        path
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, including any query string.
    pub path: String,
    pub body: Option<Value>,
    /// Report a 401 as an ordinary error instead of expiring the session.
    /// Set by sign-in requests, where a 401 means bad credentials.
    pub skip_auth_redirect: bool,
}

#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Api")
    }
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Api { transport }
    }

    pub async fn get<T>(&self, path: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.call(Method::GET, path, None, false).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.call(Method::POST, path, Some(body), false).await
    }

    /// POST that leaves the session alone on a 401.
    pub async fn post_unguarded<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.call(Method::POST, path, Some(body), true).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.call(Method::PUT, path, Some(body), false).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.transport
            .send(ApiRequest {
                method: Method::DELETE,
                path: path.to_string(),
                body: None,
                skip_auth_redirect: false,
            })
            .await
            .map(|_| ())
    }

    async fn call<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        skip_auth_redirect: bool,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let reply = self
            .transport
            .send(ApiRequest {
                method,
                path: path.to_string(),
                body,
                skip_auth_redirect,
            })
            .await?;

        match reply {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
