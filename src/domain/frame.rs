// Frame composition - Everything the renderer needs for one draw, computed up front
use crate::domain::display::{DisplayState, Icon};
use chrono::{DateTime, FixedOffset, Timelike, Utc};

pub const DATE_FORMAT: &str = "%a, %b %d %Y";
pub const MUTE_ALPHA: u8 = 100;
pub const NORMAL_ALPHA: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Plain black, no divider
    Ambient,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typeface {
    Normal,
    Thin,
}

/// Brightness used for the date, min temperature and divider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Light,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub anti_alias: bool,
    pub alpha: u8,
    pub typeface: Typeface,
    pub secondary_tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherLine {
    pub max_temperature: String,
    pub min_temperature: String,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchFrame {
    pub now_millis: i64,
    pub background: Background,
    pub hour: String,
    pub colon_visible: bool,
    pub minute: String,
    pub date: Option<String>,
    pub weather: Option<WeatherLine>,
    pub style: TextStyle,
}

impl WatchFrame {
    /// Clock text as it appears on screen, with a blank in place of a hidden colon.
    pub fn time_text(&self) -> String {
        let colon = if self.colon_visible { ':' } else { ' ' };
        format!("{}{}{}", self.hour, colon, self.minute)
    }
}

/// Colons are shown for the first half of each second so they blink with the ticks.
pub fn colon_visible(ambient: bool, mute: bool, now_millis: i64) -> bool {
    ambient || mute || now_millis.rem_euclid(1000) < 500
}

pub fn compose_frame(
    state: &DisplayState,
    now_millis: i64,
    utc_offset: FixedOffset,
    peek_card_visible: bool,
) -> WatchFrame {
    let local = DateTime::<Utc>::from_timestamp_millis(now_millis)
        .unwrap_or_default()
        .with_timezone(&utc_offset);
    let (_, hour) = local.hour12();

    let weather = state.has_weather().then(|| WeatherLine {
        max_temperature: state.max_temperature.clone().unwrap_or_default(),
        min_temperature: state.min_temperature.clone().unwrap_or_default(),
        icon: if state.is_ambient {
            None
        } else {
            state.condition_icon.clone()
        },
    });

    WatchFrame {
        now_millis,
        background: if state.is_ambient {
            Background::Ambient
        } else {
            Background::Interactive
        },
        hour: format!("{:02}", hour),
        colon_visible: colon_visible(state.is_ambient, state.is_muted, now_millis),
        minute: format!("{:02}", local.minute()),
        date: if peek_card_visible {
            None
        } else {
            Some(local.format(DATE_FORMAT).to_string())
        },
        weather,
        style: text_style(state),
    }
}

fn text_style(state: &DisplayState) -> TextStyle {
    TextStyle {
        anti_alias: !(state.low_bit_ambient && state.is_ambient),
        alpha: if state.is_muted { MUTE_ALPHA } else { NORMAL_ALPHA },
        typeface: if state.burn_in_protection {
            Typeface::Thin
        } else {
            Typeface::Normal
        },
        secondary_tone: if state.is_ambient { Tone::Full } else { Tone::Light },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::display::encode_png;
    use crate::domain::payload::AssetRef;

    // 2017-02-18 13:05:00 UTC, a Saturday
    const SATURDAY_1305: i64 = 1_487_423_100_000;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn weather_state() -> DisplayState {
        DisplayState {
            max_temperature: Some("72°".to_string()),
            min_temperature: Some("54°".to_string()),
            condition_icon: Some(Icon::decode(AssetRef::new("ic_clear"), encode_png(24, 24)).unwrap()),
            is_visible: true,
            ..DisplayState::default()
        }
    }

    #[test]
    fn test_colon_boundaries() {
        assert!(colon_visible(false, false, 0));
        assert!(colon_visible(false, false, 499));
        assert!(!colon_visible(false, false, 500));
        assert!(!colon_visible(false, false, 999));
        assert!(colon_visible(false, false, 1_000));
        assert!(colon_visible(true, false, 999));
        assert!(colon_visible(false, true, 500));
    }

    #[test]
    fn test_clock_and_date_text() {
        let frame = compose_frame(&weather_state(), SATURDAY_1305, utc(), false);
        assert_eq!(frame.hour, "01");
        assert_eq!(frame.minute, "05");
        assert_eq!(frame.time_text(), "01:05");
        assert_eq!(frame.date.as_deref(), Some("Sat, Feb 18 2017"));

        let half_second_later = compose_frame(&weather_state(), SATURDAY_1305 + 700, utc(), false);
        assert_eq!(half_second_later.time_text(), "01 05");
    }

    #[test]
    fn test_midnight_shows_twelve_in_local_offset() {
        // 2017-02-18 05:30 UTC is midnight at UTC-05:30
        let offset = FixedOffset::west_opt(5 * 3600 + 1800).unwrap();
        let frame = compose_frame(&DisplayState::default(), 1_487_395_800_000, offset, false);
        assert_eq!(frame.hour, "12");
        assert_eq!(frame.minute, "00");
        assert_eq!(frame.date.as_deref(), Some("Sat, Feb 18 2017"));
    }

    #[test]
    fn test_peek_card_hides_date() {
        let frame = compose_frame(&weather_state(), SATURDAY_1305, utc(), true);
        assert_eq!(frame.date, None);
    }

    #[test]
    fn test_weather_needs_both_temperatures() {
        let mut state = weather_state();
        let frame = compose_frame(&state, SATURDAY_1305, utc(), false);
        let weather = frame.weather.unwrap();
        assert_eq!(weather.max_temperature, "72°");
        assert!(weather.icon.is_some());

        state.min_temperature = None;
        let frame = compose_frame(&state, SATURDAY_1305, utc(), false);
        assert!(frame.weather.is_none());
    }

    #[test]
    fn test_ambient_frame() {
        let mut state = weather_state();
        state.is_ambient = true;
        state.low_bit_ambient = true;

        let frame = compose_frame(&state, SATURDAY_1305 + 700, utc(), false);
        assert_eq!(frame.background, Background::Ambient);
        assert!(frame.colon_visible);
        assert!(!frame.style.anti_alias);
        assert_eq!(frame.style.secondary_tone, Tone::Full);
        assert!(frame.weather.unwrap().icon.is_none());
    }

    #[test]
    fn test_mute_and_burn_in_style() {
        let mut state = weather_state();
        state.is_muted = true;
        state.burn_in_protection = true;

        let style = compose_frame(&state, SATURDAY_1305, utc(), false).style;
        assert_eq!(style.alpha, MUTE_ALPHA);
        assert_eq!(style.typeface, Typeface::Thin);
        assert!(style.anti_alias);
    }
}
