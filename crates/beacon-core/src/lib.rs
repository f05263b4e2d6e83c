//! # beacon-core
//!
//! Foundation types for the beacon presence relay.
//!
//! This crate provides the shared vocabulary the server crates depend on:
//!
//! - **Identity**: [`ids::ClientId`] — opaque per-connection token, unique
//!   while the connection is open
//! - **State**: [`position::Position`] — last-known client position on the
//!   shared canvas
//! - **Wire protocol**: [`protocol::ClientMessage`] and
//!   [`protocol::ServerMessage`] tagged JSON enums
//! - **Errors**: [`errors::RegistryError`], [`errors::ProtocolError`] via
//!   `thiserror`
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other beacon crates.

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod position;
pub mod protocol;

pub use errors::{ProtocolError, RegistryError};
pub use ids::ClientId;
pub use position::Position;
pub use protocol::{ClientMessage, ServerMessage};
