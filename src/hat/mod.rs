//! Rainbow HAT peripherals on a Raspberry Pi running Linux.

pub mod apa102;
pub mod button;
pub mod ht16k33;

use crate::config::{ButtonMapping, DisplayConfig, StripConfig};
use crate::error::PeripheralError;
use crate::peripheral::{Board, KeyEvent};
use apa102::Apa102;
use button::GpioButton;
use ht16k33::Ht16k33;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{I2cdev, SpidevDevice};
use log::info;
use rppal::gpio::Gpio;
use std::time::Duration;
use tokio::sync::mpsc::Sender;

pub struct RainbowHat {
    gpio: Option<Gpio>,
    debounce: Duration,
    events: Sender<KeyEvent>,
}

impl RainbowHat {
    pub fn new(debounce: Duration, events: Sender<KeyEvent>) -> Self {
        RainbowHat {
            gpio: None,
            debounce,
            events,
        }
    }

    fn gpio(&mut self) -> Result<&Gpio, PeripheralError> {
        if self.gpio.is_none() {
            let gpio = Gpio::new().map_err(|e| PeripheralError::acquire("GPIO", e))?;
            self.gpio = Some(gpio);
        }
        self.gpio
            .as_ref()
            .ok_or_else(|| PeripheralError::acquire("GPIO", "controller unavailable"))
    }
}

impl Board for RainbowHat {
    type Button = GpioButton;
    type Display = Ht16k33<I2cdev>;
    type Strip = Apa102<SpidevDevice>;

    fn open_button(&mut self, mapping: &ButtonMapping) -> Result<Self::Button, PeripheralError> {
        let debounce = self.debounce;
        let events = self.events.clone();
        GpioButton::new(self.gpio()?, mapping, debounce, events)
    }

    fn open_display(&mut self, config: &DisplayConfig) -> Result<Self::Display, PeripheralError> {
        let address = u8::try_from(config.address).map_err(|e| PeripheralError::acquire(config.device.as_str(), e))?;
        let i2c = I2cdev::new(&config.device).map_err(|e| PeripheralError::acquire(config.device.as_str(), e))?;
        info!("I2C device opened: {} (0x{:02x})", config.device, address);
        Ht16k33::new(i2c, address, &config.device, config.brightness)
    }

    fn open_strip(&mut self, config: &StripConfig) -> Result<Self::Strip, PeripheralError> {
        let mut spi = SpidevDevice::open(&config.device)
            .map_err(|e| PeripheralError::acquire(config.device.as_str(), format!("{:?}", e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.0
            .configure(&options)
            .map_err(|e| PeripheralError::acquire(config.device.as_str(), e))?;
        info!("SPI device opened: {} @ {} Hz", config.device, config.speed_hz);
        Ok(Apa102::new(spi, &config.device, config.color_order))
    }
}
