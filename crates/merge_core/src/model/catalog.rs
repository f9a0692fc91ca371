//! Shop catalog model.
//!
//! # Responsibility
//! - Define the static, read-only list of purchasable items.
//! - Validate catalog data once at construction so lookups never fail on
//!   malformed entries.
//!
//! # Invariants
//! - Item ids are unique and match `[a-z0-9_]+`.
//! - Prices are strictly positive.
//! - Attached effects pass `GameplayEffect::validate()`.

use crate::model::economy::DEFAULT_SLOT;
use crate::model::effect::{EffectValidationError, GameplayEffect};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ITEM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid item id regex"));

/// One purchasable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub title: String,
    pub price: u64,
    #[serde(default = "default_slot")]
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<GameplayEffect>,
}

fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}

/// Catalog construction errors.
#[derive(Debug)]
pub enum CatalogError {
    InvalidItemId(String),
    DuplicateItemId(String),
    ZeroPrice(String),
    InvalidEffect {
        item_id: String,
        source: EffectValidationError,
    },
    Parse(serde_json::Error),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidItemId(id) => write!(f, "catalog item id is invalid: `{id}`"),
            Self::DuplicateItemId(id) => write!(f, "catalog item id is duplicated: `{id}`"),
            Self::ZeroPrice(id) => write!(f, "catalog item `{id}` must have a positive price"),
            Self::InvalidEffect { item_id, source } => {
                write!(f, "catalog item `{item_id}` has an invalid effect: {source}")
            }
            Self::Parse(err) => write!(f, "catalog json is malformed: {err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEffect { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Validated, read-only item list.
///
/// Constructed explicitly and handed to the shop coordinator; there is no
/// process-wide catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<ShopItem>,
}

impl Catalog {
    /// Builds a catalog after validating every entry.
    pub fn new(items: Vec<ShopItem>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for item in &items {
            if !ITEM_ID_RE.is_match(&item.id) {
                return Err(CatalogError::InvalidItemId(item.id.clone()));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateItemId(item.id.clone()));
            }
            if item.price == 0 {
                return Err(CatalogError::ZeroPrice(item.id.clone()));
            }
            if let Some(effect) = &item.effect {
                effect
                    .validate()
                    .map_err(|source| CatalogError::InvalidEffect {
                        item_id: item.id.clone(),
                        source,
                    })?;
            }
        }
        Ok(Self { items })
    }

    /// Parses and validates a JSON array of items.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<ShopItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    /// The shipped catalog: a spawn boost and a session score doubler.
    pub fn standard() -> Self {
        Self {
            items: vec![
                ShopItem {
                    id: "spawn_boost_1".to_string(),
                    title: "Boost Spawn".to_string(),
                    price: 300,
                    slot: default_slot(),
                    effect: Some(GameplayEffect::SpawnDistributionOverride {
                        values: vec![2, 2, 4, 4],
                    }),
                },
                ShopItem {
                    id: "score_x2".to_string(),
                    title: "Score x2 (session)".to_string(),
                    price: 500,
                    slot: default_slot(),
                    effect: Some(GameplayEffect::ScoreMultiplier { multiplier: 2.0 }),
                },
            ],
        }
    }

    pub fn get(&self, item_id: &str) -> Option<&ShopItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
