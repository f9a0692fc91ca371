//! Economy use-case service.
//!
//! # Responsibility
//! - Run onboarding awards, reward claims and purchases against the remote
//!   authority first, and against the local store when it is unavailable.
//! - Report which side answered through `StateSource`.
//!
//! # Invariants
//! - The remote is called exactly once per operation; the local path runs at
//!   most once and only after `RemoteOutcome::Unavailable`.
//! - Local mutations run inside `LocalStateStore::update_state`: read, change
//!   and write hold the store's write lock together, and a rejected or failed
//!   operation leaves the record untouched.
//! - Mutating operations take `&mut self`; one coordinator never runs two of
//!   them at the same time, and coordinators on other connections to the same
//!   store are serialized by the store.
//! - Remote and local histories are not reconciled; a remote answer is taken
//!   verbatim.

use crate::config::EconomyConfig;
use crate::model::economy::UserEconomyState;
use crate::remote::capability::{RemoteCapability, RemoteOperation, RemoteOutcome, RemoteRequest};
use crate::repo::state_repo::{LocalStateStore, RepoError};
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Which side produced an operation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    Remote,
    Local,
}

impl StateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Economy use-case errors.
#[derive(Debug)]
pub enum EconomyError {
    /// Local balance cannot cover the price; nothing was charged.
    InsufficientFunds {
        item_id: String,
        price: u64,
        balance: u64,
    },
    /// Local record could not be read or written.
    Storage(RepoError),
}

impl Display for EconomyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientFunds {
                item_id,
                price,
                balance,
            } => write!(
                f,
                "not enough coins for `{item_id}`: price {price}, balance {balance}"
            ),
            Self::Storage(err) => write!(f, "local economy storage failed: {err}"),
        }
    }
}

impl Error for EconomyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::InsufficientFunds { .. } => None,
        }
    }
}

impl From<RepoError> for EconomyError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Result of `get_state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EconomySnapshot {
    pub state: UserEconomyState,
    pub source: StateSource,
}

/// Result of `award_onboarding_if_needed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingOutcome {
    pub awarded: bool,
    pub state: UserEconomyState,
    pub source: StateSource,
}

/// Result of a successful `purchase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub state: UserEconomyState,
    pub source: StateSource,
}

/// Result of `claim_reward`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardOutcome {
    pub claimed: bool,
    pub state: UserEconomyState,
    pub source: StateSource,
}

#[derive(Debug, Deserialize)]
struct RemoteStateResponse {
    state: UserEconomyState,
}

#[derive(Debug, Deserialize)]
struct RemoteAwardResponse {
    awarded: bool,
    state: UserEconomyState,
}

#[derive(Debug, Deserialize)]
struct RemoteClaimResponse {
    claimed: bool,
    state: UserEconomyState,
}

/// Builds the reward id for a daily reward on `day` (ISO date, e.g.
/// `2026-10-17`), claimable once per day.
pub fn daily_reward_id(day: &str) -> String {
    format!("daily:{}", day.trim())
}

/// Remote-first economy coordinator with local fallback.
pub struct EconomyCoordinator<S: LocalStateStore, R: RemoteCapability> {
    store: S,
    remote: R,
    onboarding_award: u64,
}

impl<S: LocalStateStore, R: RemoteCapability> EconomyCoordinator<S, R> {
    /// Creates a coordinator with the default onboarding award.
    pub fn new(store: S, remote: R) -> Self {
        Self::with_config(store, remote, &EconomyConfig::default())
    }

    pub fn with_config(store: S, remote: R, config: &EconomyConfig) -> Self {
        Self {
            store,
            remote,
            onboarding_award: config.onboarding_award,
        }
    }

    pub fn onboarding_award(&self) -> u64 {
        self.onboarding_award
    }

    /// Returns the authoritative state: remote when reachable, else local.
    pub fn get_state(&self, user_id: Option<&str>) -> Result<EconomySnapshot, EconomyError> {
        let request = RemoteRequest::new(
            RemoteOperation::FetchUserState,
            json!({ "userId": user_id }),
        );
        if let RemoteOutcome::Ok(response) = self
            .remote
            .call(&request)
            .decode::<RemoteStateResponse>(request.operation)
        {
            return Ok(EconomySnapshot {
                state: response.state,
                source: StateSource::Remote,
            });
        }

        Ok(EconomySnapshot {
            state: self.store.load_state()?,
            source: StateSource::Local,
        })
    }

    /// Grants the first-run coin award at most once.
    pub fn award_onboarding_if_needed(
        &mut self,
        user_id: Option<&str>,
    ) -> Result<OnboardingOutcome, EconomyError> {
        let request = RemoteRequest::new(
            RemoteOperation::AwardOnboarding,
            json!({ "userId": user_id }),
        );
        if let RemoteOutcome::Ok(response) = self
            .remote
            .call(&request)
            .decode::<RemoteAwardResponse>(request.operation)
        {
            log_completed("onboarding_award", StateSource::Remote, response.awarded);
            return Ok(OnboardingOutcome {
                awarded: response.awarded,
                state: response.state,
                source: StateSource::Remote,
            });
        }

        let amount = self.onboarding_award;
        let (awarded, state) = self
            .store
            .update_state(|state| -> Result<_, EconomyError> {
                Ok((state.grant_onboarding(amount), state.clone()))
            })?;
        log_completed("onboarding_award", StateSource::Local, awarded);
        Ok(OnboardingOutcome {
            awarded,
            state,
            source: StateSource::Local,
        })
    }

    /// Credits `amount` for `reward_id` at most once.
    pub fn claim_reward(
        &mut self,
        user_id: Option<&str>,
        reward_id: &str,
        amount: u64,
    ) -> Result<RewardOutcome, EconomyError> {
        let request = RemoteRequest::new(
            RemoteOperation::ClaimReward,
            json!({
                "userId": user_id,
                "rewardId": reward_id,
                "amount": amount,
                "requestId": Uuid::new_v4().to_string(),
            }),
        );
        if let RemoteOutcome::Ok(response) = self
            .remote
            .call(&request)
            .decode::<RemoteClaimResponse>(request.operation)
        {
            log_completed("reward_claim", StateSource::Remote, response.claimed);
            return Ok(RewardOutcome {
                claimed: response.claimed,
                state: response.state,
                source: StateSource::Remote,
            });
        }

        let (claimed, state) = self
            .store
            .update_state(|state| -> Result<_, EconomyError> {
                Ok((state.grant_reward(reward_id, amount), state.clone()))
            })?;
        log_completed("reward_claim", StateSource::Local, claimed);
        Ok(RewardOutcome {
            claimed,
            state,
            source: StateSource::Local,
        })
    }

    /// Charges `price` for `item_id`, records ownership and equips it in
    /// `slot`.
    ///
    /// # Errors
    /// - `InsufficientFunds` when the local balance is below `price`; the
    ///   record is left untouched.
    /// - `Storage` when the local record cannot be read or written.
    pub fn purchase(
        &mut self,
        user_id: Option<&str>,
        item_id: &str,
        price: u64,
        slot: &str,
    ) -> Result<PurchaseReceipt, EconomyError> {
        let request = RemoteRequest::new(
            RemoteOperation::PurchaseItem,
            json!({
                "userId": user_id,
                "itemId": item_id,
                "requestId": Uuid::new_v4().to_string(),
            }),
        );
        if let RemoteOutcome::Ok(response) = self
            .remote
            .call(&request)
            .decode::<RemoteStateResponse>(request.operation)
        {
            log_completed("purchase", StateSource::Remote, true);
            return Ok(PurchaseReceipt {
                state: response.state,
                source: StateSource::Remote,
            });
        }

        let state = self
            .store
            .update_state(|state| {
                state
                    .apply_purchase(item_id, price, slot)
                    .map(|()| state.clone())
                    .map_err(|balance| EconomyError::InsufficientFunds {
                        item_id: item_id.to_string(),
                        price,
                        balance,
                    })
            })
            .map_err(|err| {
                if let EconomyError::InsufficientFunds { balance, .. } = &err {
                    info!(
                        "event=purchase module=economy status=rejected source=local reason=insufficient_funds item_id={} price={} balance={}",
                        item_id, price, balance
                    );
                }
                err
            })?;
        log_completed("purchase", StateSource::Local, true);
        Ok(PurchaseReceipt {
            state,
            source: StateSource::Local,
        })
    }
}

fn log_completed(event: &str, source: StateSource, applied: bool) {
    info!(
        "event={} module=economy status=ok source={} applied={}",
        event,
        source.as_str(),
        applied
    );
}

#[cfg(test)]
mod tests {
    use super::{daily_reward_id, EconomyCoordinator, EconomyError, StateSource};
    use crate::db::open_db_in_memory;
    use crate::remote::capability::OfflineRemote;
    use crate::repo::state_repo::SqliteStateStore;

    #[test]
    fn daily_reward_id_is_prefixed_and_trimmed() {
        assert_eq!(daily_reward_id(" 2026-10-17 "), "daily:2026-10-17");
    }

    #[test]
    fn offline_purchase_reports_price_and_balance() {
        let conn = open_db_in_memory().unwrap();
        let mut economy = EconomyCoordinator::new(SqliteStateStore::new(&conn), OfflineRemote);

        let err = economy
            .purchase(None, "score_x2", 500, "default")
            .expect_err("empty wallet cannot buy");
        assert!(matches!(
            err,
            EconomyError::InsufficientFunds { price: 500, balance: 0, .. }
        ));
        assert!(err.to_string().contains("score_x2"));
    }

    #[test]
    fn offline_get_state_creates_defaults() {
        let conn = open_db_in_memory().unwrap();
        let economy = EconomyCoordinator::new(SqliteStateStore::new(&conn), OfflineRemote);

        let snapshot = economy.get_state(Some("player-1")).unwrap();
        assert_eq!(snapshot.source, StateSource::Local);
        assert_eq!(snapshot.state.coins, 0);
    }
}
