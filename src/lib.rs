pub mod app;
pub mod bridge;
pub mod client;
pub mod config;
pub mod progress;
pub mod shared;
pub mod work_package;
