//! Packet model and textual codec for the chatbus messaging fabric.
//!
//! This crate has no network or crypto dependencies of its own — it is the
//! leaf of the dependency order: the packet model sits right above the
//! security manager and below everything that moves packets around.

mod codec;
mod content;
mod error;
pub mod event_type;
mod packet;

pub use codec::{decode, encode};
pub use content::{Content, Scalar};
pub use error::{ProtocolError, ProtocolResult};
pub use packet::Packet;
