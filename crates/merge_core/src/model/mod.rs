//! Domain model shared by the merge engine and the economy layer.
//!
//! # Responsibility
//! - Define the durable player economy record.
//! - Define gameplay effects and the shop catalog that carries them.
//!
//! # Invariants
//! - Economy containers are always present; absence is an empty container.
//! - Gameplay effects are a closed set matched exhaustively by the engine.

pub mod catalog;
pub mod economy;
pub mod effect;
