// Watch face engine - Wearable-side consumer that owns the display state
//
// One task owns `DisplayState`, the redraw scheduler and the renderer. Host events
// arrive through `EngineHandle`; timers, the data subscription and icon decodes run
// as separate tasks and only ever report back over the internal channel.
use crate::application::clock::Clock;
use crate::application::redraw_scheduler::{RedrawScheduler, TickToken, TimerAction, UpdateRates};
use crate::application::renderer::Renderer;
use crate::application::sync_channel::{SyncChannel, SyncError};
use crate::domain::display::{DisplayProperties, DisplayState, Icon, InterruptionFilter};
use crate::domain::frame::compose_frame;
use crate::domain::payload::{AssetRef, DataEvent, DataEventKind, WEATHER_PATH, WeatherPayload};
use chrono::FixedOffset;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const HOST_EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapType {
    Touch,
    TouchCancel,
    Tap,
}

/// Lifecycle and environment callbacks delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    InterruptionFilterChanged(InterruptionFilter),
    PropertiesChanged(DisplayProperties),
    /// Once-a-minute tick the host sends in ambient mode
    TimeTick,
    TimeZoneChanged(FixedOffset),
    PeekCardChanged(bool),
    Tap(TapType),
    Destroy,
}

enum Internal {
    DataChanged(Vec<DataEvent>),
    IconDecoded { generation: u64, icon: Option<Icon> },
    RedrawTick(TickToken),
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub data_path: String,
    pub connect_timeout: Duration,
    pub update_rates: UpdateRates,
    pub properties: DisplayProperties,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            data_path: WEATHER_PATH.to_string(),
            connect_timeout: Duration::from_secs(30),
            update_rates: UpdateRates::default(),
            properties: DisplayProperties::default(),
        }
    }
}

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Returns false once the engine has stopped.
    pub async fn send(&self, event: EngineEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }
}

/// Counters reported when the engine stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub frames_drawn: u64,
    pub ticks: u64,
    pub data_events: u64,
    pub icons_decoded: u64,
}

pub struct WatchFaceEngine {
    settings: EngineSettings,
    state: DisplayState,
    scheduler: RedrawScheduler,
    renderer: Box<dyn Renderer>,
    clock: Arc<dyn Clock>,
    channel: Arc<dyn SyncChannel>,
    utc_offset: FixedOffset,
    peek_card_visible: bool,
    icon_asset: Option<AssetRef>,
    decode_generation: u64,
    applied_generation: u64,
    timer: Option<JoinHandle<()>>,
    subscription: Option<JoinHandle<()>>,
    host_rx: mpsc::Receiver<EngineEvent>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    dirty: bool,
    stats: EngineStats,
}

impl WatchFaceEngine {
    pub fn new(
        settings: EngineSettings,
        renderer: Box<dyn Renderer>,
        clock: Arc<dyn Clock>,
        channel: Arc<dyn SyncChannel>,
    ) -> (Self, EngineHandle) {
        let (host_tx, host_rx) = mpsc::channel(HOST_EVENT_CAPACITY);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let engine = Self {
            state: DisplayState::new(settings.properties),
            scheduler: RedrawScheduler::new(settings.update_rates),
            utc_offset: clock.utc_offset(),
            settings,
            renderer,
            clock,
            channel,
            peek_card_visible: false,
            icon_asset: None,
            decode_generation: 0,
            applied_generation: 0,
            timer: None,
            subscription: None,
            host_rx,
            internal_tx,
            internal_rx,
            dirty: false,
            stats: EngineStats::default(),
        };
        (engine, EngineHandle { tx: host_tx })
    }

    pub fn spawn(self) -> JoinHandle<EngineStats> {
        tokio::spawn(self.run())
    }

    /// Process events until `Destroy` arrives or every handle is dropped.
    pub async fn run(mut self) -> EngineStats {
        tracing::debug!("Watch face engine started");
        loop {
            tokio::select! {
                biased;
                event = self.host_rx.recv() => match event {
                    Some(EngineEvent::Destroy) | None => break,
                    Some(event) => self.handle_event(event),
                },
                Some(message) = self.internal_rx.recv() => self.handle_internal(message),
            }
            if self.dirty {
                self.draw();
            }
        }
        self.teardown();
        tracing::debug!("Watch face engine stopped: {:?}", self.stats);
        self.stats
    }

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::VisibilityChanged(visible) => self.on_visibility_changed(visible),
            EngineEvent::AmbientModeChanged(ambient) => self.on_ambient_mode_changed(ambient),
            EngineEvent::InterruptionFilterChanged(filter) => {
                self.on_interruption_filter_changed(filter)
            }
            EngineEvent::PropertiesChanged(properties) => {
                self.state.apply_properties(properties);
                self.invalidate();
            }
            EngineEvent::TimeTick => self.invalidate(),
            EngineEvent::TimeZoneChanged(offset) => {
                self.utc_offset = offset;
                self.invalidate();
            }
            EngineEvent::PeekCardChanged(visible) => {
                self.peek_card_visible = visible;
                self.invalidate();
            }
            EngineEvent::Tap(tap) => {
                if tap == TapType::Tap {
                    tracing::info!("Tap on watch face");
                }
                self.invalidate();
            }
            EngineEvent::Destroy => {}
        }
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::DataChanged(events) => self.on_data_changed(events),
            Internal::IconDecoded { generation, icon } => self.on_icon_decoded(generation, icon),
            Internal::RedrawTick(token) => {
                let outcome = self.scheduler.on_tick(token, self.clock.now_millis());
                if outcome.redraw {
                    self.stats.ticks += 1;
                    self.invalidate();
                }
                self.apply_timer(outcome.action);
            }
        }
    }

    fn on_visibility_changed(&mut self, visible: bool) {
        self.state.is_visible = visible;
        if visible {
            self.connect_subscription();
            // Time zone may have changed while hidden.
            self.utc_offset = self.clock.utc_offset();
            self.invalidate();
        } else {
            self.release_subscription();
        }
        let action = self.scheduler.set_visible(visible);
        self.apply_timer(action);
    }

    fn on_ambient_mode_changed(&mut self, ambient: bool) {
        if self.state.is_ambient != ambient {
            self.state.is_ambient = ambient;
            self.invalidate();
        }
        let action = self.scheduler.set_ambient(ambient);
        self.apply_timer(action);
    }

    fn on_interruption_filter_changed(&mut self, filter: InterruptionFilter) {
        let mute = filter.is_mute();
        if self.state.is_muted != mute {
            self.state.is_muted = mute;
            self.invalidate();
        }
        let action = self.scheduler.set_mute(mute);
        self.apply_timer(action);
    }

    fn on_data_changed(&mut self, events: Vec<DataEvent>) {
        for event in events {
            if event.kind != DataEventKind::Changed || event.item.path != self.settings.data_path {
                continue;
            }
            self.stats.data_events += 1;

            let payload = match WeatherPayload::from_data_map(&event.item.data) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Ignoring malformed weather item: {}", e);
                    continue;
                }
            };
            tracing::debug!(
                "Weather data changed: {:?} {:?} at {}",
                payload.max_temperature,
                payload.min_temperature,
                payload.timestamp_millis
            );

            if let Some(max) = payload.max_temperature {
                self.state.max_temperature = Some(max);
            }
            if let Some(min) = payload.min_temperature {
                self.state.min_temperature = Some(min);
            }
            if let Some(asset) = payload.weather_icon {
                if self.icon_asset.as_ref() != Some(&asset) {
                    self.icon_asset = Some(asset.clone());
                    self.start_icon_decode(asset);
                }
            }
            self.invalidate();
        }
    }

    fn on_icon_decoded(&mut self, generation: u64, icon: Option<Icon>) {
        if generation <= self.applied_generation {
            tracing::debug!("Discarding icon from superseded decode {}", generation);
            return;
        }
        self.applied_generation = generation;
        match icon {
            Some(icon) => {
                self.stats.icons_decoded += 1;
                self.state.condition_icon = Some(icon);
                self.invalidate();
            }
            // A newer decode is still in flight and owns `icon_asset`.
            None if generation < self.decode_generation => {}
            None => {
                // Keep the stale icon; let a redelivery of the same asset try again.
                self.icon_asset = self.state.condition_icon.as_ref().map(|i| i.asset().clone());
            }
        }
    }

    fn start_icon_decode(&mut self, asset: AssetRef) {
        self.decode_generation += 1;
        let generation = self.decode_generation;
        let channel = self.channel.clone();
        let tx = self.internal_tx.clone();
        let timeout = self.settings.connect_timeout;

        tracing::debug!("Decoding icon {} (decode {})", asset, generation);
        tokio::spawn(async move {
            let icon = load_icon(channel.as_ref(), &asset, timeout).await;
            let _ = tx.send(Internal::IconDecoded { generation, icon });
        });
    }

    fn connect_subscription(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let channel = self.channel.clone();
        let tx = self.internal_tx.clone();
        let timeout = self.settings.connect_timeout;

        self.subscription = Some(tokio::spawn(async move {
            let subscribed = tokio::time::timeout(timeout, channel.subscribe())
                .await
                .unwrap_or(Err(SyncError::Timeout(timeout)));
            let mut events = match subscribed {
                Ok(events) => events,
                Err(e) => {
                    tracing::warn!("Data subscription failed: {}", e);
                    return;
                }
            };
            tracing::debug!("Data subscription connected");
            while let Some(batch) = events.next().await {
                if tx.send(Internal::DataChanged(batch)).is_err() {
                    break;
                }
            }
        }));
    }

    fn release_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
            tracing::debug!("Data subscription released");
        }
    }

    fn apply_timer(&mut self, action: TimerAction) {
        if action.cancel.is_some() {
            if let Some(timer) = self.timer.take() {
                timer.abort();
            }
        }
        if let Some(tick) = action.arm {
            let tx = self.internal_tx.clone();
            self.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(tick.delay_ms)).await;
                let _ = tx.send(Internal::RedrawTick(tick.token));
            }));
        }
    }

    fn invalidate(&mut self) {
        self.dirty = true;
    }

    fn draw(&mut self) {
        self.dirty = false;
        let frame = compose_frame(
            &self.state,
            self.clock.now_millis(),
            self.utc_offset,
            self.peek_card_visible,
        );
        self.renderer.draw(&frame);
        self.stats.frames_drawn += 1;
    }

    fn teardown(&mut self) {
        let action = self.scheduler.destroy();
        self.apply_timer(action);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.release_subscription();
    }
}

async fn load_icon(channel: &dyn SyncChannel, asset: &AssetRef, timeout: Duration) -> Option<Icon> {
    let fetched = tokio::time::timeout(timeout, channel.fetch_asset(asset))
        .await
        .unwrap_or(Err(SyncError::Timeout(timeout)));
    let data = match fetched {
        Ok(Some(data)) => data,
        Ok(None) => {
            tracing::warn!("Requested an unknown asset {}", asset);
            return None;
        }
        Err(e) => {
            tracing::warn!("Failed to fetch asset {}: {}", asset, e);
            return None;
        }
    };
    match Icon::decode(asset.clone(), data) {
        Ok(icon) => Some(icon),
        Err(e) => {
            tracing::warn!("Failed to decode asset {}: {}", asset, e);
            None
        }
    }
}
