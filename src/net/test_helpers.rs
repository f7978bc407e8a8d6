//! Recording transport for client and endpoint tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};

use super::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Replays queued responses in order and records every request.
///
/// An empty queue answers with a transport error.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(ApiResponse { status, body: body.to_owned() }));
    }

    pub(crate) fn fail(&self) {
        self.responses.borrow_mut().push_back(Err(TransportError("connection refused".to_owned())));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<ApiResponse, TransportError>> {
        self.requests.borrow_mut().push(request);
        let reply = self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no response queued".to_owned())));
        future::ready(reply).boxed_local()
    }
}
