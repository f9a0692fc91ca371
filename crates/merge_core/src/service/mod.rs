//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate remote-first, local-fallback economy operations.
//! - Keep UI collaborators decoupled from storage and transport details.

pub mod economy_service;
pub mod shop_service;
