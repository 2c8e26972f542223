//! Book catalogue API: books with ordered pages, token authentication, and
//! role-gated writes.
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - [`domain`] holds entities, validated newtypes, policy, and ports.
//! - [`inbound`] translates HTTP requests into domain calls.
//! - [`outbound`] implements the ports against PostgreSQL and argon2.
//! - [`server`] wires both sides together and runs the listener.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
