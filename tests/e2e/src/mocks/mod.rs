//! Test doubles and data factories

mod fixtures;

pub use fixtures::{Delivery, MockSynapse, RecordingBindingTarget};
