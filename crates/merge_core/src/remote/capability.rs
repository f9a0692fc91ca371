//! Remote authority contract.
//!
//! # Responsibility
//! - Name the operations the economy layer may ask the remote side for.
//! - Reduce every remote answer to `Ok(payload)` or `Unavailable`.
//!
//! # Invariants
//! - Implementations never panic and never return transport errors.
//! - A payload that does not match the operation's expected shape is
//!   treated exactly like an unreachable remote.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Operations understood by the remote authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    FetchUserState,
    AwardOnboarding,
    PurchaseItem,
    ClaimReward,
}

impl RemoteOperation {
    /// Wire name of the operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchUserState => "fetch-user-state",
            Self::AwardOnboarding => "award-onboarding",
            Self::PurchaseItem => "purchase-item",
            Self::ClaimReward => "claim-reward",
        }
    }
}

/// One remote call: operation name plus JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub operation: RemoteOperation,
    pub payload: Value,
}

impl RemoteRequest {
    pub fn new(operation: RemoteOperation, payload: Value) -> Self {
        Self { operation, payload }
    }
}

/// Binary remote result.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome<T = Value> {
    /// The remote answered affirmatively with this payload.
    Ok(T),
    /// Unreachable, refused, timed out or answered with garbage.
    Unavailable,
}

impl RemoteOutcome<Value> {
    /// Decodes the payload into the operation's response shape.
    ///
    /// Decode failures collapse into `Unavailable`.
    pub fn decode<T: DeserializeOwned>(self, operation: RemoteOperation) -> RemoteOutcome<T> {
        match self {
            Self::Ok(payload) => match serde_json::from_value(payload) {
                Ok(decoded) => RemoteOutcome::Ok(decoded),
                Err(err) => {
                    warn!(
                        "event=remote_call module=remote status=unavailable operation={} reason=malformed_payload error={}",
                        operation.as_str(),
                        err
                    );
                    RemoteOutcome::Unavailable
                }
            },
            Self::Unavailable => RemoteOutcome::Unavailable,
        }
    }
}

/// Best-effort request function to the remote authority.
pub trait RemoteCapability {
    fn call(&self, request: &RemoteRequest) -> RemoteOutcome;
}

impl<R: RemoteCapability + ?Sized> RemoteCapability for &R {
    fn call(&self, request: &RemoteRequest) -> RemoteOutcome {
        (**self).call(request)
    }
}

impl<R: RemoteCapability + ?Sized> RemoteCapability for Box<R> {
    fn call(&self, request: &RemoteRequest) -> RemoteOutcome {
        (**self).call(request)
    }
}

/// Remote that is never reachable. Used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl RemoteCapability for OfflineRemote {
    fn call(&self, _request: &RemoteRequest) -> RemoteOutcome {
        RemoteOutcome::Unavailable
    }
}
