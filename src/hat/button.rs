use crate::config::ButtonMapping;
use crate::error::PeripheralError;
use crate::peripheral::{ButtonInput, Key, KeyEvent, Polarity};
use log::{debug, info, warn};
use rppal::gpio::{Event, Gpio, InputPin, Trigger};
use std::time::Duration;
use tokio::sync::mpsc::Sender;

/// Push-button on a GPIO line. Edges are turned into key events and queued
/// for the controller from rppal's interrupt thread.
pub struct GpioButton {
    pin: InputPin,
    key: Key,
}

impl GpioButton {
    pub fn new(
        gpio: &Gpio,
        mapping: &ButtonMapping,
        debounce: Duration,
        events: Sender<KeyEvent>,
    ) -> Result<Self, PeripheralError> {
        let device = format!("GPIO{}", mapping.line);
        let pin = gpio
            .get(mapping.line)
            .map_err(|e| PeripheralError::acquire(device.as_str(), e))?;
        let mut pin = match mapping.polarity {
            Polarity::ActiveLow => pin.into_input_pullup(),
            Polarity::ActiveHigh => pin.into_input_pulldown(),
        };

        let key = mapping.key;
        let polarity = mapping.polarity;
        pin.set_async_interrupt(Trigger::Both, debounce_period(debounce), move |event: Event| {
            let key_event = edge_event(event.trigger == Trigger::RisingEdge, polarity, key);
            debug!("{:?} -> {:?}", event.trigger, key_event);
            if let Err(e) = events.try_send(key_event) {
                warn!("Dropped {:?}: {}", key_event, e);
            }
        })
        .map_err(|e| PeripheralError::acquire(device.as_str(), e))?;

        info!("  - Button {:?} on {} ({:?})", key, device, polarity);
        Ok(GpioButton { pin, key })
    }
}

/// A zero debounce turns rppal's debounce filter off.
pub fn debounce_period(debounce: Duration) -> Option<Duration> {
    (!debounce.is_zero()).then_some(debounce)
}

/// Key event produced by an edge on a button of the given polarity.
pub fn edge_event(rising: bool, polarity: Polarity, key: Key) -> KeyEvent {
    let pressed = match polarity {
        Polarity::ActiveLow => !rising,
        Polarity::ActiveHigh => rising,
    };
    if pressed {
        KeyEvent::Down(key)
    } else {
        KeyEvent::Up(key)
    }
}

impl ButtonInput for GpioButton {
    fn release(mut self) -> Result<(), PeripheralError> {
        info!("Releasing button {:?} on GPIO{}", self.key, self.pin.pin());
        self.pin
            .clear_async_interrupt()
            .map_err(|e| PeripheralError::io(format!("GPIO{}", self.pin.pin()), "button release", e))
    }
}
