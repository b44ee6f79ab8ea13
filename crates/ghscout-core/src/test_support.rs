use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;

use crate::http_transport::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<anyhow::Result<HttpResponse>>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new(responses: Vec<anyhow::Result<HttpResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl HttpTransport for RecordingTransport {
    fn get(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse> {
        self.calls.lock().expect("calls lock").push(request.clone());

        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("missing response")))
    }
}

pub fn response(status: u16, body: &str) -> anyhow::Result<HttpResponse> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

pub fn transport_error(message: &str) -> anyhow::Result<HttpResponse> {
    Err(anyhow!(message.to_string()))
}
