pub mod catalog;
pub mod config;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod portal;
pub mod report;
pub mod snapshot;
pub mod types;
