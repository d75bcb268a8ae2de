mod call_engine;
mod negotiation;
mod status;

pub use call_engine::{CallEngine, EngineChannels};
pub use negotiation::NegotiationState;
pub use status::{CallCommand, CallStatus};
