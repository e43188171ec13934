// Renderer that writes each frame to the log instead of a canvas
use crate::application::renderer::Renderer;
use crate::domain::frame::{Background, WatchFrame};

/// Height of the temperature text the icon is scaled against
const TEMPERATURE_TEXT_SIZE: f32 = 32.0;

#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn draw(&mut self, frame: &WatchFrame) {
        self.frames += 1;
        let mode = match frame.background {
            Background::Ambient => "ambient",
            Background::Interactive => "interactive",
        };
        let weather = match &frame.weather {
            Some(line) => {
                let icon = line
                    .icon
                    .as_ref()
                    .map(|i| {
                        let (width, height) = i.scaled_to_text(TEMPERATURE_TEXT_SIZE);
                        format!(" [{} {}x{}]", i.asset(), width, height)
                    })
                    .unwrap_or_default();
                format!("{} {}{}", line.max_temperature, line.min_temperature, icon)
            }
            None => "--".to_string(),
        };
        tracing::info!(
            frame = self.frames,
            mode,
            alpha = frame.style.alpha,
            "{} | {} | {}",
            frame.time_text(),
            frame.date.as_deref().unwrap_or(""),
            weather
        );
    }
}
