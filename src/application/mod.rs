// Application layer - Use cases and the seams the host platform fills in
pub mod clock;
pub mod redraw_scheduler;
pub mod renderer;
pub mod sync_channel;
pub mod watch_face_engine;
pub mod weather_source;
pub mod weather_sync_service;
