pub mod aggregate;
pub mod config;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod match_cache;
pub mod model;
pub mod names;
pub mod pitch;
pub mod provider;
pub mod report;
pub mod state;
pub mod statsbomb;
