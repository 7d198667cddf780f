use crate::chase::{Chase, OFF, STRIP_LEN};
use crate::config::Config;
use crate::error::PeripheralError;
use crate::peripheral::{AlphanumericDisplay, Board, ButtonInput, Key, KeyEvent, LedStrip};
use log::{debug, error, info, trace, warn};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// What the scheduler should do after an animation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Again(Duration),
    Stop,
}

/// Deadline of the next animation tick. The first tick is due at once; later
/// ticks are due one interval after the previous tick returned.
#[derive(Debug)]
pub struct Schedule {
    next: Option<Instant>,
}

impl Schedule {
    pub fn new() -> Self {
        Schedule {
            next: Some(Instant::now()),
        }
    }

    pub fn stopped(&self) -> bool {
        self.next.is_none()
    }

    /// Resolves when the next tick is due; never resolves once stopped.
    pub async fn wait(&self) {
        match self.next {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    pub fn after(&mut self, tick: Tick) {
        self.next = match tick {
            Tick::Again(delay) => Some(Instant::now() + delay),
            Tick::Stop => None,
        };
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the HAT peripherals and the chase animation state.
pub struct Controller<B: Board> {
    buttons: Vec<Option<B::Button>>,
    display: Option<B::Display>,
    strip: Option<B::Strip>,
    chase: Chase,
    interval: Duration,
}

impl<B: Board> Controller<B> {
    /// Acquire every peripheral. Failures are logged and leave that peripheral unavailable.
    pub fn start(board: &mut B, config: &Config) -> Self {
        info!("Registering {} button(s)", config.buttons.len());
        let buttons = config
            .buttons
            .iter()
            .map(|mapping| match board.open_button(mapping) {
                Ok(button) => Some(button),
                Err(e) => {
                    error!("Button {:?} on line {} unavailable: {}", mapping.key, mapping.line, e);
                    None
                }
            })
            .collect();

        let display = match board.open_display(&config.display).and_then(|mut display| {
            display.set_enabled(true)?;
            show_greeting(&mut display)?;
            Ok(display)
        }) {
            Ok(display) => {
                info!("Display initialized: {}", config.display.device);
                Some(display)
            }
            Err(e) => {
                error!("Error initializing display: {}", e);
                None
            }
        };

        let mut brightness = config.strip.brightness;
        if brightness == 0 {
            warn!("Strip brightness 0 would hide the animation, using 1");
            brightness = 1;
        }
        let strip = match board.open_strip(&config.strip).and_then(|mut strip| {
            strip.set_brightness(brightness)?;
            Ok(strip)
        }) {
            Ok(strip) => {
                info!("LED strip initialized: {}", config.strip.device);
                Some(strip)
            }
            Err(e) => {
                error!("Error initializing LEDs: {}", e);
                None
            }
        };

        Controller {
            buttons,
            display,
            strip,
            chase: Chase::new(),
            interval: config.animation.interval(),
        }
    }

    pub fn animating(&self) -> bool {
        self.strip.is_some()
    }

    /// Render the current frame, then advance. Stops for good once the strip
    /// is gone or a write fails.
    pub fn tick(&mut self) -> Tick {
        let Some(strip) = self.strip.as_mut() else {
            debug!("No LED strip, animation stopped");
            return Tick::Stop;
        };

        let frame = self.chase.frame();
        if let Err(e) = strip.write(&frame) {
            warn!("Error lighting LEDs: {}", e);
            return Tick::Stop;
        }
        trace!("Chase at {} ({:?})", self.chase.position(), self.chase.direction());

        self.chase.advance();
        Tick::Again(self.interval)
    }

    pub fn handle(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Down(key) => self.key_down(key),
            KeyEvent::Up(key) => self.key_up(key),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        let Some(display) = self.display.as_mut() else {
            debug!("Key {:?} down ignored, no display", key);
            return;
        };
        let result = display.clear().and_then(|_| match key {
            Key::A => display.display_char('A', 0, false),
            Key::B => display.display_char('B', 1, false),
            Key::C => display.display_char('C', 2, false),
            Key::Other(_) => display.display_text("!!!!"),
        });
        if let Err(e) = result {
            warn!("Display update for key {:?} failed: {}", key, e);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        let Some(display) = self.display.as_mut() else {
            debug!("Key {:?} up ignored, no display", key);
            return;
        };
        if let Err(e) = show_greeting(display) {
            warn!("Display reset for key {:?} failed: {}", key, e);
        }
    }

    /// Release everything. Safe to call more than once.
    pub fn shutdown(&mut self) {
        for button in self.buttons.iter_mut().filter_map(Option::take) {
            if let Err(e) = button.release() {
                warn!("Error releasing button: {}", e);
            }
        }

        if let Some(mut strip) = self.strip.take() {
            if let Err(e) = strip.write(&[OFF; STRIP_LEN]) {
                warn!("Error blanking LEDs: {}", e);
            }
            if let Err(e) = strip.set_brightness(0) {
                warn!("Error dimming LEDs: {}", e);
            }
            if let Err(e) = strip.release() {
                warn!("Error releasing LED strip: {}", e);
            }
        }

        self.display = None;
    }
}

fn show_greeting<D: AlphanumericDisplay>(display: &mut D) -> Result<(), PeripheralError> {
    display.clear()?;
    display.display_char('H', 1, false)?;
    display.display_char('I', 2, false)
}
