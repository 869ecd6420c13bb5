//! HTTP middleware

mod gate_chain;

pub use gate_chain::{GateChain, request_context};
