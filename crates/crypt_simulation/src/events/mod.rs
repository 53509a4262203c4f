//! Pub-sub шина + имена каналов

pub mod bus;
pub mod channels;


pub use bus::{listener, typed_listener, EventBus, Listener, Payload, Subscriptions};
