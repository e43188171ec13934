// Display domain models - Watch face view-model and decoded icon
use crate::domain::payload::AssetRef;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IconError {
    #[error("icon is not a decodable PNG: {0}")]
    Decode(#[from] png::DecodingError),
}

/// Decoded condition icon, ready to hand to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    asset: AssetRef,
    width: u32,
    height: u32,
    pixels: Bytes,
}

impl Icon {
    /// Decode the whole image, through to the end chunk. Palette and sub-byte
    /// formats are expanded so `pixels` holds whole-byte samples.
    pub fn decode(asset: AssetRef, data: Bytes) -> Result<Self, IconError> {
        let mut decoder = png::Decoder::new(&data[..]);
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info()?;

        let mut pixels = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut pixels)?;
        reader.finish()?;
        pixels.truncate(frame.buffer_size());

        Ok(Self {
            asset,
            width: frame.width,
            height: frame.height,
            pixels: Bytes::from(pixels),
        })
    }

    pub fn asset(&self) -> &AssetRef {
        &self.asset
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &Bytes {
        &self.pixels
    }

    /// Size the icon to sit next to temperature text of the given height.
    pub fn scaled_to_text(&self, text_size: f32) -> (u32, u32) {
        let width = (text_size / self.height as f32) * self.width as f32 + 15.0;
        let height = text_size + 15.0;
        (width as u32, height as u32)
    }
}

/// Notification filter reported by the host; `None` silences everything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionFilter {
    All,
    Priority,
    Alarms,
    None,
}

impl InterruptionFilter {
    pub fn is_mute(self) -> bool {
        self == InterruptionFilter::None
    }
}

/// Screen capabilities supplied once by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayProperties {
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub max_temperature: Option<String>,
    pub min_temperature: Option<String>,
    pub condition_icon: Option<Icon>,
    pub is_ambient: bool,
    pub is_muted: bool,
    pub is_visible: bool,
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
}

impl DisplayState {
    pub fn new(properties: DisplayProperties) -> Self {
        Self {
            low_bit_ambient: properties.low_bit_ambient,
            burn_in_protection: properties.burn_in_protection,
            ..Self::default()
        }
    }

    pub fn apply_properties(&mut self, properties: DisplayProperties) {
        self.low_bit_ambient = properties.low_bit_ambient;
        self.burn_in_protection = properties.burn_in_protection;
    }

    pub fn has_weather(&self) -> bool {
        self.max_temperature.is_some() && self.min_temperature.is_some()
    }
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> Bytes {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&vec![0x80; (width * height * 4) as usize])
            .unwrap();
        writer.finish().unwrap();
    }
    Bytes::from(out)
}
