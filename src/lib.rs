// src/lib.rs

pub mod api;
pub mod common;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;
