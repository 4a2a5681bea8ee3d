//! The per-node network pipeline: Listener -> Inbound Queue -> Dispatcher
//! -> application, and application -> Outbound Queue -> Sender.

mod assembly;
mod dispatcher;
mod error;
mod listener;
mod observer;
mod queue;
mod receiver;
mod sender;
mod wire;

pub use assembly::NetworkAssembly;
pub use dispatcher::Dispatcher;
pub use error::{NetError, NetResult};
pub use listener::Listener;
pub use observer::{NotifyObserver, QueueObserver};
pub use queue::{InboundQueue, OutboundItem, OutboundQueue, DEFAULT_CAPACITY};
pub use receiver::PacketReceiver;
pub use sender::Sender;
pub use wire::{decode_frame_body, encode_frame, FRAME_TERMINATOR, MAX_FRAME_BYTES};
