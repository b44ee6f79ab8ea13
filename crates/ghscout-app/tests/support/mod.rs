#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::mpsc::Sender;

use anyhow::anyhow;
use ghscout_app::{LookupCompletion, LookupDispatcher, LookupJob, LookupOutcome, Ticket};
use ghscout_core::github::{Account, Repository};
use ghscout_core::http_transport::{HttpRequest, HttpResponse, HttpTransport};

pub struct Dispatched {
    pub ticket: Ticket,
    pub job: LookupJob,
    reply: Sender<LookupCompletion>,
}

impl Dispatched {
    pub fn resolve(&self, outcome: LookupOutcome) {
        self.reply
            .send(LookupCompletion {
                ticket: self.ticket,
                outcome,
            })
            .expect("send completion");
    }
}

/// Holds every dispatched job so a test can resolve them in any order.
#[derive(Default)]
pub struct ScriptedDispatcher {
    dispatched: Mutex<Vec<Dispatched>>,
}

impl ScriptedDispatcher {
    pub fn jobs(&self) -> Vec<LookupJob> {
        self.dispatched
            .lock()
            .expect("dispatched lock")
            .iter()
            .map(|value| value.job.clone())
            .collect()
    }

    pub fn resolve(&self, index: usize, outcome: LookupOutcome) {
        self.dispatched.lock().expect("dispatched lock")[index].resolve(outcome);
    }
}

impl LookupDispatcher for ScriptedDispatcher {
    fn dispatch(&self, ticket: Ticket, job: LookupJob, reply: Sender<LookupCompletion>) {
        self.dispatched
            .lock()
            .expect("dispatched lock")
            .push(Dispatched { ticket, job, reply });
    }
}

#[derive(Default)]
pub struct QueueTransport {
    responses: Mutex<VecDeque<anyhow::Result<HttpResponse>>>,
    calls: Mutex<Vec<String>>,
}

impl QueueTransport {
    pub fn new(responses: Vec<anyhow::Result<HttpResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl HttpTransport for QueueTransport {
    fn get(&self, request: &HttpRequest) -> anyhow::Result<HttpResponse> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(request.url.clone());

        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("missing scripted response")))
    }
}

pub fn response(status: u16, body: &str) -> anyhow::Result<HttpResponse> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

pub fn account(handle: &str) -> Account {
    Account {
        handle: handle.to_string(),
        avatar_url: format!("https://avatars.example/{handle}"),
    }
}

pub fn repo(name: &str, description: Option<&str>) -> Repository {
    Repository {
        name: name.to_string(),
        display_name: format!("octocat/{name}"),
        description: description.map(str::to_string),
    }
}
