pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod logging;
pub mod sample;
pub mod selector;
pub mod state;
pub mod view;
