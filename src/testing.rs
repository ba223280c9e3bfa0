//! In-memory transport for exercising the stores without a server.

use async_trait::async_trait;
use hyper::Method;
use serde_json::Value;
use tokio::sync::oneshot;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::api::{Api, ApiRequest};
use crate::client::{Error, Result, Transport};
use crate::observable::lock;

pub(crate) enum Reply {
    Json(Value),
    Empty,
    Failure { status: u16, message: String },
    /// Held until the test sends the real reply.
    Deferred(oneshot::Receiver<Reply>),
}

/// Replays queued replies in order and records every request it sees.
/// Once the queue is empty each request gets `Reply::Empty`.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(ScriptedTransport::default())
    }

    pub(crate) fn api(self: &Arc<Self>) -> Api {
        Api::new(self.clone())
    }

    pub(crate) fn reply(&self, reply: Reply) {
        lock(&self.replies).push_back(reply);
    }

    pub(crate) fn reply_json(&self, value: Value) {
        self.reply(Reply::Json(value));
    }

    pub(crate) fn reply_failure(&self, status: u16, message: &str) {
        self.reply(Reply::Failure {
            status,
            message: message.to_string(),
        });
    }

    /// Returns the sender that releases the reply.
    pub(crate) fn reply_deferred(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.reply(Reply::Deferred(rx));
        tx
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    pub(crate) fn last_request(&self) -> ApiRequest {
        lock(&self.requests)
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub(crate) fn assert_last(&self, method: Method, path: &str) {
        let request = self.last_request();
        assert_eq!(request.method, method);
        assert_eq!(request.path, path);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>> {
        lock(&self.requests).push(request);
        let mut reply = lock(&self.replies).pop_front().unwrap_or(Reply::Empty);

        loop {
            reply = match reply {
                Reply::Deferred(rx) => rx.await.unwrap_or(Reply::Failure {
                    status: 499,
                    message: "reply dropped".to_string(),
                }),
                Reply::Json(Value::Null) | Reply::Empty => return Ok(None),
                Reply::Json(value) => return Ok(Some(value)),
                Reply::Failure { status, message } => {
                    return Err(Error::Response { status, message })
                }
            };
        }
    }
}
