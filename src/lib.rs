pub mod classifier;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod links;
pub mod output;
pub mod pipeline;
pub mod policy;
pub mod synthesizer;
