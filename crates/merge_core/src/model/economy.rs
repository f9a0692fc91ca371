//! Player economy record.
//!
//! # Responsibility
//! - Define the canonical shape of one player's coins, purchases and rewards.
//! - Provide the in-memory mutations used by the local fallback path.
//!
//! # Invariants
//! - `coins` never goes below zero; debits are checked before mutation.
//! - `has_received_onboarding` only ever flips from `false` to `true`.
//! - `inventory` holds each item id at most once.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Slot used when a catalog item does not name one.
pub const DEFAULT_SLOT: &str = "default";

/// Durable economy record for one player.
///
/// Serialized in camelCase so the same shape is shared with the remote
/// authority payloads and the local JSON record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserEconomyState {
    pub coins: u64,
    pub has_received_onboarding: bool,
    /// Items ever purchased.
    pub inventory: BTreeSet<String>,
    /// Current cosmetic selection, keyed by slot name.
    pub equipped_by_slot: BTreeMap<String, String>,
    /// Reward ids already credited.
    pub claimed_rewards: BTreeSet<String>,
}

impl UserEconomyState {
    /// Returns whether the item has ever been purchased.
    pub fn owns(&self, item_id: &str) -> bool {
        self.inventory.contains(item_id)
    }

    /// Returns the item equipped in `slot`, if any.
    pub fn equipped(&self, slot: &str) -> Option<&str> {
        self.equipped_by_slot.get(slot).map(String::as_str)
    }

    /// Credits the onboarding award once.
    ///
    /// Returns `false` and leaves the record untouched when the award was
    /// already granted.
    pub fn grant_onboarding(&mut self, amount: u64) -> bool {
        if self.has_received_onboarding {
            return false;
        }
        self.coins = self.coins.saturating_add(amount);
        self.has_received_onboarding = true;
        true
    }

    /// Credits a reward once per `reward_id`.
    pub fn grant_reward(&mut self, reward_id: &str, amount: u64) -> bool {
        if self.claimed_rewards.contains(reward_id) {
            return false;
        }
        self.coins = self.coins.saturating_add(amount);
        self.claimed_rewards.insert(reward_id.to_string());
        true
    }

    /// Debits `price`, records ownership and equips the item in `slot`.
    ///
    /// # Errors
    /// - Returns the current balance when `coins < price`; nothing is mutated.
    pub fn apply_purchase(&mut self, item_id: &str, price: u64, slot: &str) -> Result<(), u64> {
        let Some(remaining) = self.coins.checked_sub(price) else {
            return Err(self.coins);
        };
        self.coins = remaining;
        self.inventory.insert(item_id.to_string());
        self.equipped_by_slot
            .insert(slot.to_string(), item_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::UserEconomyState;

    #[test]
    fn deserializes_sparse_record_with_empty_containers() {
        let state: UserEconomyState =
            serde_json::from_str(r#"{"coins": 40}"#).expect("sparse record should decode");
        assert_eq!(state.coins, 40);
        assert!(!state.has_received_onboarding);
        assert!(state.inventory.is_empty());
        assert!(state.equipped_by_slot.is_empty());
        assert!(state.claimed_rewards.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut state = UserEconomyState::default();
        state.grant_onboarding(500);
        let json = serde_json::to_value(&state).expect("state should encode");
        assert_eq!(json["hasReceivedOnboarding"], true);
        assert!(json.get("equippedBySlot").is_some());
    }

    #[test]
    fn onboarding_is_granted_once() {
        let mut state = UserEconomyState::default();
        assert!(state.grant_onboarding(500));
        assert!(!state.grant_onboarding(500));
        assert_eq!(state.coins, 500);
    }

    #[test]
    fn purchase_without_funds_leaves_state_untouched() {
        let mut state = UserEconomyState {
            coins: 10,
            ..UserEconomyState::default()
        };
        let before = state.clone();
        assert_eq!(state.apply_purchase("score_x2", 500, "default"), Err(10));
        assert_eq!(state, before);
    }

    #[test]
    fn repurchase_does_not_duplicate_inventory() {
        let mut state = UserEconomyState {
            coins: 1000,
            ..UserEconomyState::default()
        };
        state.apply_purchase("spawn_boost_1", 300, "default").unwrap();
        state.apply_purchase("spawn_boost_1", 300, "default").unwrap();
        assert_eq!(state.coins, 400);
        assert_eq!(state.inventory.len(), 1);
        assert_eq!(state.equipped("default"), Some("spawn_boost_1"));
    }
}
