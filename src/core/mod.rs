// src/core/mod.rs
//! HTTP plumbing shared by the directory and identity clients

pub mod service_client;

pub use service_client::ServiceClient;
