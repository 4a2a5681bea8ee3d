mod event_bus;
mod service_record;

pub use event_bus::{BusReceiver, EventBus};
pub use service_record::ServiceRecord;
