use crate::peripheral::{ColorOrder, Key, Polarity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub buttons: Vec<ButtonMapping>,
    pub debounce_ms: u64,
    pub display: DisplayConfig,
    pub strip: StripConfig,
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonMapping {
    /// BCM GPIO line number
    pub line: u8,
    pub key: Key,
    #[serde(default)]
    pub polarity: Polarity,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub device: String,
    pub address: u16,
    /// HT16K33 dimming level, 0..=15
    pub brightness: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub device: String,
    pub speed_hz: u32,
    pub color_order: ColorOrder,
    /// APA102 global brightness, 1..=31
    pub brightness: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub interval_ms: u64,
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AnimationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buttons: vec![
                ButtonMapping::active_low(21, Key::A, "Button A"),
                ButtonMapping::active_low(20, Key::B, "Button B"),
                ButtonMapping::active_low(16, Key::C, "Button C"),
            ],
            debounce_ms: 20,
            display: DisplayConfig::default(),
            strip: StripConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl ButtonMapping {
    fn active_low(line: u8, key: Key, description: &str) -> Self {
        Self {
            line,
            key,
            polarity: Polarity::ActiveLow,
            description: Some(description.to_string()),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: "/dev/i2c-1".to_string(),
            address: 0x70,
            brightness: 15,
        }
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            device: "/dev/spidev0.0".to_string(),
            speed_hz: 1_000_000,
            color_order: ColorOrder::Rgb,
            brightness: 1,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}
