// src/lib.rs
pub mod cli;
pub mod config;
pub mod core;
pub mod directory;
pub mod error;
pub mod filter;
pub mod identity;
pub mod normalizer;
pub mod session;
pub mod taxonomy;
pub mod types;
pub mod view_model;

pub use config::ClientConfig;
pub use core::ServiceClient;
pub use directory::{JobDirectory, JobDirectoryApi, JobDirectorySnapshot};
pub use error::{Error, ErrorKind, Result};
pub use filter::{filter, FilterCache, FilterField, FilterState};
pub use identity::IdentityClient;
pub use normalizer::{normalize, normalize_batch};
pub use session::Session;
pub use taxonomy::Taxonomy;
pub use types::{JobRecord, NewJob};
pub use view_model::{build_view_model, JobCard, ResultViewModel};
