// Infrastructure layer - Config, in-process channel and host stand-ins
pub mod config;
pub mod configured_weather_source;
pub mod icon_source;
pub mod log_renderer;
pub mod memory_channel;
pub mod system_clock;
