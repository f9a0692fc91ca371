//! Merge puzzle engine.
//!
//! # Responsibility
//! - Resolve directional moves with pairwise, once-per-move merging.
//! - Keep board state independent from economy state; effects arrive only
//!   through `GridEngine::apply_effect`.

pub mod grid;
pub mod line;
