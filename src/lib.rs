pub mod clean;
pub mod common;
pub mod config;
pub mod extract;
pub mod load;
pub mod logging;
pub mod pipeline;
