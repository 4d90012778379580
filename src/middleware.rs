// src/middleware.rs

pub mod auth;

pub use auth::{Route, RouteDecision, guard};
