//! Shop use-case service.
//!
//! # Responsibility
//! - Resolve catalog items and charge them through the economy coordinator.
//! - Hand the item's gameplay effect back to the caller.
//!
//! # Invariants
//! - The shop never touches a board; callers feed the returned effect into
//!   `GridEngine::apply_effect`.
//! - The charged price is always the catalog price.

use crate::model::catalog::{Catalog, ShopItem};
use crate::model::economy::UserEconomyState;
use crate::model::effect::GameplayEffect;
use crate::remote::capability::RemoteCapability;
use crate::repo::state_repo::LocalStateStore;
use crate::service::economy_service::{EconomyCoordinator, EconomyError, StateSource};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Shop use-case errors.
#[derive(Debug)]
pub enum ShopError {
    /// The item id is not in the catalog.
    ItemNotFound(String),
    /// The economy rejected or failed the charge.
    Economy(EconomyError),
}

impl Display for ShopError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(item_id) => write!(f, "shop item not found: `{item_id}`"),
            Self::Economy(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ShopError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Economy(err) => Some(err),
            Self::ItemNotFound(_) => None,
        }
    }
}

impl From<EconomyError> for ShopError {
    fn from(value: EconomyError) -> Self {
        Self::Economy(value)
    }
}

/// Successful purchase with the effect to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopPurchase {
    pub state: UserEconomyState,
    pub effect: Option<GameplayEffect>,
    pub item: ShopItem,
    pub source: StateSource,
}

/// Catalog-aware purchase facade over an economy coordinator.
pub struct ShopCoordinator<'c, S: LocalStateStore, R: RemoteCapability> {
    catalog: &'c Catalog,
    economy: EconomyCoordinator<S, R>,
}

impl<'c, S: LocalStateStore, R: RemoteCapability> ShopCoordinator<'c, S, R> {
    pub fn new(catalog: &'c Catalog, economy: EconomyCoordinator<S, R>) -> Self {
        Self { catalog, economy }
    }

    /// Economy coordinator used for charges (onboarding, rewards, balance).
    pub fn economy(&self) -> &EconomyCoordinator<S, R> {
        &self.economy
    }

    pub fn economy_mut(&mut self) -> &mut EconomyCoordinator<S, R> {
        &mut self.economy
    }

    /// Buys `item_id` at its catalog price and returns its effect.
    pub fn purchase_and_apply(
        &mut self,
        user_id: Option<&str>,
        item_id: &str,
    ) -> Result<ShopPurchase, ShopError> {
        let Some(item) = self.catalog.get(item_id) else {
            warn!(
                "event=shop_purchase module=shop status=error reason=item_not_found item_id={}",
                item_id
            );
            return Err(ShopError::ItemNotFound(item_id.to_string()));
        };

        let receipt = self
            .economy
            .purchase(user_id, &item.id, item.price, &item.slot)?;
        Ok(ShopPurchase {
            state: receipt.state,
            effect: item.effect.clone(),
            item: item.clone(),
            source: receipt.source,
        })
    }
}
