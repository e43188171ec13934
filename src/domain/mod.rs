// Domain layer - Weather data, sync payload and watch face view-model
pub mod display;
pub mod frame;
pub mod payload;
pub mod weather;
