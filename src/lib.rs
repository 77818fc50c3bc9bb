pub mod analyzers;
pub mod config;
pub mod fetch;
pub mod index;
pub mod output;
pub mod parser;
pub mod stats;
