//! Stub transports that record requests and answer with canned responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use sky_core::{AsyncTransport, Endpoint, HttpRequest, HttpResponse, SkyError, Transport};

/// What the stub answers with, one entry per expected request.
pub enum Reply {
    Status(u16, &'static str),
    Unreachable,
}

#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl RecordingTransport {
    pub fn replying(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }

    pub fn ok(body: &'static str) -> Self {
        Self::replying([Reply::Status(200, body)])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn answer(&self, request: &HttpRequest) -> Result<HttpResponse, SkyError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Status(200, ""));
        match reply {
            Reply::Status(status, body) => Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }),
            Reply::Unreachable => Err(SkyError::Connection("connection refused".to_string())),
        }
    }
}

impl Transport for RecordingTransport {
    fn execute(
        &self,
        _endpoint: &Endpoint,
        request: &HttpRequest,
    ) -> Result<HttpResponse, SkyError> {
        self.answer(request)
    }
}

impl AsyncTransport for RecordingTransport {
    async fn execute(
        &self,
        _endpoint: &Endpoint,
        request: &HttpRequest,
    ) -> Result<HttpResponse, SkyError> {
        tokio::task::yield_now().await;
        self.answer(request)
    }
}
