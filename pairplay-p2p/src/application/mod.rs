pub mod config;
pub mod negotiator;

pub use config::NegotiatorConfig;
pub use negotiator::PeerConnectionNegotiator;
