//! Scripted in-memory transport for unit tests.

use super::{BodySink, RequestSpec, ResponseHead, Transport, TransportError};
use std::cell::RefCell;
use std::collections::HashMap;

pub(crate) enum FakeResponse {
    Page(String),
    Status(u32),
    Binary {
        head: ResponseHead,
        body: Vec<u8>,
        chunk: usize,
    },
}

/// Serves canned responses by exact URL; unknown URLs answer HTTP 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: HashMap<String, FakeResponse>,
    requests: RefCell<Vec<RequestSpec>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, html: &str) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Page(html.to_string()));
        self
    }

    pub(crate) fn status(mut self, url: &str, code: u32) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Status(code));
        self
    }

    pub(crate) fn binary(mut self, url: &str, head: ResponseHead, body: Vec<u8>, chunk: usize) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Binary { head, body, chunk });
        self
    }

    /// URLs requested so far, in order.
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }

    pub(crate) fn last_request(&self, url: &str) -> Option<RequestSpec> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|r| r.url == url)
            .cloned()
    }
}

impl Transport for FakeTransport {
    fn get_page(&self, req: &RequestSpec) -> Result<String, TransportError> {
        self.requests.borrow_mut().push(req.clone());
        match self.responses.get(&req.url) {
            Some(FakeResponse::Page(html)) => Ok(html.clone()),
            Some(FakeResponse::Status(code)) => Err(TransportError::Http(*code)),
            Some(FakeResponse::Binary { body, .. }) => Ok(String::from_utf8_lossy(body).into_owned()),
            None => Err(TransportError::Http(404)),
        }
    }

    fn stream(
        &self,
        req: &RequestSpec,
        sink: &mut dyn BodySink,
    ) -> Result<ResponseHead, TransportError> {
        self.requests.borrow_mut().push(req.clone());
        match self.responses.get(&req.url) {
            Some(FakeResponse::Binary { head, body, chunk }) => {
                sink.on_head(head)?;
                for part in body.chunks((*chunk).max(1)) {
                    sink.on_chunk(part)?;
                }
                Ok(head.clone())
            }
            Some(FakeResponse::Page(html)) => {
                let head = ResponseHead {
                    status: Some(200),
                    content_type: Some("text/html".to_string()),
                    ..ResponseHead::default()
                };
                sink.on_head(&head)?;
                sink.on_chunk(html.as_bytes())?;
                Ok(head)
            }
            Some(FakeResponse::Status(code)) => Err(TransportError::Http(*code)),
            None => Err(TransportError::Http(404)),
        }
    }
}
