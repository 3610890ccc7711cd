pub mod config;
pub mod format;
pub mod metrics;
pub mod render;
pub mod table;
pub mod view;

/// Application name for XDG paths
pub const APP_NAME: &str = "streamboard";
