//! Electrical Signal Listeners
//!
//! Interface consumed by the electrical gap-junction broadcaster, which
//! lives outside this core. Defined here so components can declare the
//! capability without depending on the broadcaster implementation.

/// A component able to receive electrical signals.
pub trait SignalListener: Send + Sync {
    /// Component id of the listener
    fn id(&self) -> &str;

    /// Deliver a signal. `data` is an opaque payload owned by the caller.
    fn on_signal(&self, signal_type: &str, source_id: &str, data: &serde_json::Value);
}
