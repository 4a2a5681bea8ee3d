//! Thin facade over the chatbus messaging fabric, kept at the workspace
//! root purely so the `tests/integration/*` suites have one crate to
//! depend on. The real implementation lives in `crates/cb-protocol`,
//! `crates/cb-crypto`, and `crates/cb-net`; the service binaries
//! (`services/bus`, `services/authserver`, `services/client`) compose
//! those crates into runnable processes.

pub use cb_crypto::{CryptoError, CryptoResult, SecurityManager};
pub use cb_net::{NetError, NetResult, NetworkAssembly, PacketReceiver};
pub use cb_protocol::{event_type, Content, Packet};
