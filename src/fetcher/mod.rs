pub mod client;
pub mod errors;
pub mod types;

pub use client::{fetch, probe};
pub use errors::FetchError;
pub use types::{PageResponse, ProbeResponse};
