//! HTTP outbound adapters for the grading backend.

mod dto;
mod gateway;
mod health;

pub use gateway::HttpApiGateway;
pub use health::HttpHealthProbe;
