// Main entry point - Dependency injection and a phone/watch demo session
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use weather_watchface::application::watch_face_engine::{EngineEvent, EngineSettings, WatchFaceEngine};
use weather_watchface::application::weather_sync_service::WeatherSyncService;
use weather_watchface::infrastructure::config::load_app_config;
use weather_watchface::infrastructure::configured_weather_source::ConfiguredWeatherSource;
use weather_watchface::infrastructure::icon_source::FileIconSource;
use weather_watchface::infrastructure::log_renderer::LogRenderer;
use weather_watchface::infrastructure::memory_channel::MemoryChannel;
use weather_watchface::infrastructure::system_clock::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Shared stand-ins for the host platform
    let clock = Arc::new(SystemClock);
    let channel = Arc::new(MemoryChannel::new());

    // Phone side
    let weather_source = ConfiguredWeatherSource::new(config.weather.record.clone());
    let sync_service = WeatherSyncService::new(
        channel.clone(),
        Arc::new(FileIconSource::new(&config.weather.icons_dir)),
        clock.clone(),
        config.sync.data_path.clone(),
        config.weather.units,
    );

    // Watch side
    let settings = EngineSettings {
        data_path: config.sync.data_path.clone(),
        connect_timeout: config.sync.connect_timeout(),
        update_rates: config.watch_face.update_rates(),
        properties: config.watch_face.display_properties(),
    };
    let (engine, handle) =
        WatchFaceEngine::new(settings, Box::new(LogRenderer::new()), clock.clone(), channel.clone());
    let engine = engine.spawn();

    tracing::info!(
        "Starting weather watch face demo for {}s on {}",
        config.demo.run_secs,
        config.sync.data_path
    );
    handle.send(EngineEvent::VisibilityChanged(true)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let run_for = Duration::from_secs(config.demo.run_secs);
    let mut sync_interval =
        tokio::time::interval(Duration::from_secs(config.demo.sync_interval_secs.max(1)));
    let deadline = tokio::time::sleep(run_for);
    let ambient_at = tokio::time::sleep(run_for / 2);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(deadline, ambient_at, shutdown);
    let mut ambient = false;

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut shutdown => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            _ = &mut ambient_at, if !ambient => {
                ambient = true;
                handle.send(EngineEvent::AmbientModeChanged(true)).await;
            }
            _ = sync_interval.tick() => {
                let outcome = sync_service.sync_latest(&weather_source).await;
                tracing::debug!("Weather sync: {:?}", outcome);
                if ambient {
                    handle.send(EngineEvent::TimeTick).await;
                }
            }
        }
    }

    handle.send(EngineEvent::Destroy).await;
    let stats = engine.await?;
    tracing::info!(
        "Watch face stopped: {} frames, {} ticks, {} data events, {} icons",
        stats.frames_drawn,
        stats.ticks,
        stats.data_events,
        stats.icons_decoded
    );

    Ok(())
}
