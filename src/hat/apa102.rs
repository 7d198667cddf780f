use crate::error::PeripheralError;
use crate::peripheral::{ColorOrder, LedStrip};
use embedded_hal::spi::SpiDevice;
use log::{debug, info};
use smart_leds::RGB8;

pub const MAX_BRIGHTNESS: u8 = 31;

const START_FRAME: [u8; 4] = [0x00; 4];
const LED_FRAME_MARKER: u8 = 0xE0;

/// APA102 (DotStar) strip behind an SPI device.
pub struct Apa102<S> {
    spi: S,
    device_path: String,
    order: ColorOrder,
    brightness: u8,
}

impl<S: SpiDevice> Apa102<S> {
    pub fn new(spi: S, device_path: &str, order: ColorOrder) -> Self {
        info!("APA102 strip on {} ({:?})", device_path, order);
        Apa102 {
            spi,
            device_path: device_path.to_string(),
            order,
            brightness: MAX_BRIGHTNESS,
        }
    }

    fn frame(&self, colors: &[RGB8]) -> Vec<u8> {
        let end_len = colors.len().div_ceil(16).max(1);
        let mut bytes = Vec::with_capacity(START_FRAME.len() + 4 * colors.len() + end_len);
        bytes.extend_from_slice(&START_FRAME);
        for color in colors {
            bytes.push(LED_FRAME_MARKER | self.brightness);
            bytes.extend_from_slice(&self.order.arrange(*color));
        }
        bytes.extend(std::iter::repeat(0xFF).take(end_len));
        bytes
    }
}

impl<S: SpiDevice> LedStrip for Apa102<S> {
    fn set_brightness(&mut self, level: u8) -> Result<(), PeripheralError> {
        self.brightness = level.min(MAX_BRIGHTNESS);
        debug!("Brightness set to {}", self.brightness);
        Ok(())
    }

    fn write(&mut self, colors: &[RGB8]) -> Result<(), PeripheralError> {
        let bytes = self.frame(colors);
        self.spi
            .write(&bytes)
            .map_err(|e| PeripheralError::io(self.device_path.as_str(), "strip write", format!("{:?}", e)))
    }

    fn release(self) -> Result<(), PeripheralError> {
        info!("Releasing APA102 strip on {}", self.device_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation};

    #[derive(Default)]
    struct RecordingSpi {
        writes: Vec<Vec<u8>>,
        fail: bool,
    }

    impl ErrorType for RecordingSpi {
        type Error = ErrorKind;
    }

    impl SpiDevice for RecordingSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push(bytes.to_vec());
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_frame_layout() {
        let mut strip = Apa102::new(RecordingSpi::default(), "/dev/spidev0.0", ColorOrder::Rgb);
        strip.set_brightness(1).unwrap();
        strip.write(&[RGB8::new(10, 20, 30), RGB8::new(0, 0, 0)]).unwrap();
        assert_eq!(
            strip.spi.writes[0],
            vec![0, 0, 0, 0, 0xE1, 10, 20, 30, 0xE1, 0, 0, 0, 0xFF]
        );
    }

    #[test]
    fn test_color_order_applied() {
        let mut strip = Apa102::new(RecordingSpi::default(), "/dev/spidev0.0", ColorOrder::Bgr);
        strip.write(&[RGB8::new(1, 2, 3)]).unwrap();
        assert_eq!(&strip.spi.writes[0][4..8], &[0xFF, 3, 2, 1]);
    }

    #[test]
    fn test_end_frame_scales_with_length() {
        let mut strip = Apa102::new(RecordingSpi::default(), "/dev/spidev0.0", ColorOrder::Rgb);
        strip.write(&[RGB8::default(); 17]).unwrap();
        let written = &strip.spi.writes[0];
        assert_eq!(written.len(), 4 + 17 * 4 + 2);
        assert_eq!(&written[written.len() - 2..], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_brightness_clamped() {
        let mut strip = Apa102::new(RecordingSpi::default(), "/dev/spidev0.0", ColorOrder::Rgb);
        strip.set_brightness(200).unwrap();
        assert_eq!(strip.brightness, MAX_BRIGHTNESS);
        strip.set_brightness(0).unwrap();
        strip.write(&[RGB8::new(0, 255, 0)]).unwrap();
        assert_eq!(strip.spi.writes[0][4], 0xE0);
    }

    #[test]
    fn test_write_failure() {
        let mut strip = Apa102::new(RecordingSpi { fail: true, ..Default::default() }, "/dev/spidev0.0", ColorOrder::Rgb);
        assert!(matches!(
            strip.write(&[RGB8::default()]),
            Err(PeripheralError::Io { op: "strip write", .. })
        ));
    }
}
