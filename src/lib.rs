pub mod app;
pub mod audio_engine;
pub mod auto_driver;
pub mod config;
pub mod error;
pub mod field;
pub mod field_overlay;
pub mod particles;
pub mod render;
pub mod types;
