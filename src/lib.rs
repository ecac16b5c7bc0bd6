pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod models;
pub mod pipeline;
pub mod region;
pub mod scoring;
pub mod session;

#[cfg(test)]
pub mod testing;
