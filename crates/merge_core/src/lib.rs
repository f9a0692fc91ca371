//! Core logic for the merge puzzle and its coin economy.
//! This crate is the single source of truth for board and balance invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, CoreConfig, EconomyConfig, RemoteConfig};
pub use engine::grid::{
    BoardConfig, BoardConfigError, BoardSnapshot, Direction, GridEngine, MoveOutcome,
    ParseDirectionError,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::catalog::{Catalog, CatalogError, ShopItem};
pub use model::economy::{UserEconomyState, DEFAULT_SLOT};
pub use model::effect::{EffectValidationError, GameplayEffect};
pub use remote::capability::{
    OfflineRemote, RemoteCapability, RemoteOperation, RemoteOutcome, RemoteRequest,
};
pub use remote::http::{remote_from_config, HttpRemote};
pub use repo::state_repo::{LocalStateStore, RepoError, RepoResult, SqliteStateStore};
pub use service::economy_service::{
    daily_reward_id, EconomyCoordinator, EconomyError, EconomySnapshot, OnboardingOutcome,
    PurchaseReceipt, RewardOutcome, StateSource,
};
pub use service::shop_service::{ShopCoordinator, ShopError, ShopPurchase};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
