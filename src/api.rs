pub mod client;
pub mod endpoints;
pub mod gateway;

pub use client::{ApiClient, ApiConfig, TokenProvider};
pub use gateway::RequerimentoGateway;
