//! In-process loopback harness for exercising the network pipeline
//! end to end without mocking sockets — the direct analogue of
//! `rt_test_utils::MockWsServer`/`MockWsClient`.

mod recording_receiver;
mod test_node;

pub use recording_receiver::RecordingReceiver;
pub use test_node::TestNode;
