//! Clients for the external services the API leans on.

pub mod ai;
pub mod helius;
pub mod jupiter;
