#![allow(dead_code)]

use merge_core::{RemoteCapability, RemoteOperation, RemoteOutcome, RemoteRequest};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Remote double that replays queued outcomes and records every request.
///
/// Once the queue is drained it answers `Unavailable`.
#[derive(Default)]
pub struct ScriptedRemote {
    responses: RefCell<VecDeque<RemoteOutcome>>,
    calls: RefCell<Vec<RemoteRequest>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: RemoteOutcome) -> &Self {
        self.responses.borrow_mut().push_back(outcome);
        self
    }

    pub fn push_ok(&self, payload: Value) -> &Self {
        self.push(RemoteOutcome::Ok(payload))
    }

    pub fn calls(&self) -> Vec<RemoteRequest> {
        self.calls.borrow().clone()
    }

    pub fn operations(&self) -> Vec<RemoteOperation> {
        self.calls
            .borrow()
            .iter()
            .map(|request| request.operation)
            .collect()
    }
}

impl RemoteCapability for ScriptedRemote {
    fn call(&self, request: &RemoteRequest) -> RemoteOutcome {
        self.calls.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(RemoteOutcome::Unavailable)
    }
}

/// Remote-side state payload in the wire shape.
pub fn remote_state(coins: u64, has_received_onboarding: bool) -> Value {
    json!({
        "coins": coins,
        "hasReceivedOnboarding": has_received_onboarding,
        "inventory": [],
        "equippedBySlot": {},
    })
}
