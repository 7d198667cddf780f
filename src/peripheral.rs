//! Capability traits for the three peripherals and the board that opens them.

use crate::config::{ButtonMapping, DisplayConfig, StripConfig};
use crate::error::PeripheralError;
use serde::{Deserialize, Serialize};
use smart_leds::RGB8;

/// Logical key identifier assigned to a button, independent of its GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "char", into = "char")]
pub enum Key {
    A,
    B,
    C,
    Other(char),
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'A' => Key::A,
            'B' => Key::B,
            'C' => Key::C,
            _ => Key::Other(c),
        }
    }
}

impl From<Key> for char {
    fn from(key: Key) -> Self {
        match key {
            Key::A => 'A',
            Key::B => 'B',
            Key::C => 'C',
            Key::Other(c) => c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// Electrical level at which a button reads as pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    ActiveLow,
    ActiveHigh,
}

/// Order in which the strip expects the three color bytes of each LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ColorOrder {
    pub fn arrange(self, color: RGB8) -> [u8; 3] {
        let RGB8 { r, g, b } = color;
        match self {
            ColorOrder::Rgb => [r, g, b],
            ColorOrder::Rbg => [r, b, g],
            ColorOrder::Grb => [g, r, b],
            ColorOrder::Gbr => [g, b, r],
            ColorOrder::Brg => [b, r, g],
            ColorOrder::Bgr => [b, g, r],
        }
    }
}

/// A registered button. Key events are delivered out of band by the board.
pub trait ButtonInput {
    fn release(self) -> Result<(), PeripheralError>;
}

pub trait AlphanumericDisplay {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), PeripheralError>;
    fn clear(&mut self) -> Result<(), PeripheralError>;
    fn display_char(&mut self, c: char, position: usize, dot: bool) -> Result<(), PeripheralError>;
    fn display_text(&mut self, text: &str) -> Result<(), PeripheralError>;
}

pub trait LedStrip {
    fn set_brightness(&mut self, level: u8) -> Result<(), PeripheralError>;
    fn write(&mut self, colors: &[RGB8]) -> Result<(), PeripheralError>;
    fn release(self) -> Result<(), PeripheralError>;
}

/// Opens peripherals. The real implementation is [`crate::hat::RainbowHat`].
pub trait Board {
    type Button: ButtonInput;
    type Display: AlphanumericDisplay;
    type Strip: LedStrip;

    fn open_button(&mut self, mapping: &ButtonMapping) -> Result<Self::Button, PeripheralError>;
    fn open_display(&mut self, config: &DisplayConfig) -> Result<Self::Display, PeripheralError>;
    fn open_strip(&mut self, config: &StripConfig) -> Result<Self::Strip, PeripheralError>;
}
