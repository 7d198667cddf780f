//! HT16K33 driving a four digit, fourteen segment alphanumeric display over I2C.

use crate::error::PeripheralError;
use crate::peripheral::AlphanumericDisplay;
use embedded_hal::i2c::I2c;
use log::debug;

pub const DIGITS: usize = 4;

const CMD_OSCILLATOR_ON: u8 = 0x21;
const CMD_DISPLAY_OFF: u8 = 0x80;
const CMD_DISPLAY_ON: u8 = 0x81;
const CMD_BRIGHTNESS: u8 = 0xE0;
const MAX_BRIGHTNESS: u8 = 15;

const DECIMAL_POINT: u16 = 1 << 14;

/// Segment patterns for ASCII 0x20..=0x7F.
const FONT: [u16; 96] = [
    0x0000, 0x4006, 0x0202, 0x12CE, 0x12ED, 0x3FE4, 0x2359, 0x0200, // space ! " # $ % & '
    0x2400, 0x0900, 0x3FC0, 0x12C0, 0x0800, 0x00C0, 0x4000, 0x0C00, // ( ) * + , - . /
    0x0C3F, 0x0006, 0x00DB, 0x008F, 0x00E6, 0x2069, 0x00FD, 0x0007, // 0-7
    0x00FF, 0x00EF, 0x1200, 0x0A00, 0x2440, 0x00C8, 0x0980, 0x5083, // 8 9 : ; < = > ?
    0x02BB, 0x00F7, 0x128F, 0x0039, 0x120F, 0x00F9, 0x0071, 0x00BD, // @ A-G
    0x00F6, 0x1209, 0x001E, 0x2470, 0x0038, 0x0536, 0x2136, 0x003F, // H-O
    0x00F3, 0x203F, 0x20F3, 0x00ED, 0x1201, 0x003E, 0x0C30, 0x2836, // P-W
    0x2D00, 0x1500, 0x0C09, 0x0039, 0x2100, 0x000F, 0x0C03, 0x0008, // X Y Z [ \ ] ^ _
    0x0100, 0x1058, 0x2078, 0x00D8, 0x088E, 0x0858, 0x0071, 0x048E, // ` a-g
    0x1070, 0x1000, 0x000E, 0x3600, 0x0030, 0x10D4, 0x1050, 0x00DC, // h-o
    0x0170, 0x0486, 0x0050, 0x2088, 0x0078, 0x001C, 0x2004, 0x2814, // p-w
    0x28C0, 0x200C, 0x0848, 0x0949, 0x1200, 0x2489, 0x0520, 0x3FFF, // x y z { | } ~ DEL
];

/// Segment pattern for `c`; characters without a glyph are blank.
pub fn glyph(c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7F).contains(&code) {
        FONT[(code - 0x20) as usize]
    } else {
        0
    }
}

pub struct Ht16k33<I> {
    i2c: I,
    address: u8,
    device: String,
    buffer: [u16; DIGITS],
}

impl<I: I2c> Ht16k33<I> {
    /// Wake the controller and apply `brightness`. The display stays dark until enabled.
    pub fn new(i2c: I, address: u8, device: &str, brightness: u8) -> Result<Self, PeripheralError> {
        let mut display = Ht16k33 {
            i2c,
            address,
            device: device.to_string(),
            buffer: [0; DIGITS],
        };
        display
            .command(CMD_OSCILLATOR_ON)
            .map_err(|e| PeripheralError::acquire(device, format!("{:?}", e)))?;
        display
            .command(CMD_BRIGHTNESS | brightness.min(MAX_BRIGHTNESS))
            .map_err(|e| PeripheralError::acquire(device, format!("{:?}", e)))?;
        Ok(display)
    }

    fn command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.i2c.write(self.address, &[cmd])
    }

    fn flush(&mut self) -> Result<(), PeripheralError> {
        let mut bytes = [0u8; 1 + 2 * DIGITS];
        for (i, word) in self.buffer.iter().enumerate() {
            let [lo, hi] = word.to_le_bytes();
            bytes[1 + 2 * i] = lo;
            bytes[2 + 2 * i] = hi;
        }
        debug!("HT16K33 RAM <- {:04x?}", self.buffer);
        self.i2c
            .write(self.address, &bytes)
            .map_err(|e| PeripheralError::io(self.device.as_str(), "display write", format!("{:?}", e)))
    }
}

impl<I: I2c> AlphanumericDisplay for Ht16k33<I> {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), PeripheralError> {
        let cmd = if enabled { CMD_DISPLAY_ON } else { CMD_DISPLAY_OFF };
        self.command(cmd)
            .map_err(|e| PeripheralError::io(self.device.as_str(), "display enable", format!("{:?}", e)))
    }

    fn clear(&mut self) -> Result<(), PeripheralError> {
        self.buffer = [0; DIGITS];
        self.flush()
    }

    fn display_char(&mut self, c: char, position: usize, dot: bool) -> Result<(), PeripheralError> {
        if position >= DIGITS {
            return Err(PeripheralError::InvalidPosition(position));
        }
        let mut word = glyph(c);
        if dot {
            word |= DECIMAL_POINT;
        }
        self.buffer[position] = word;
        self.flush()
    }

    fn display_text(&mut self, text: &str) -> Result<(), PeripheralError> {
        let mut words = [0u16; DIGITS];
        let mut next = 0;
        for c in text.chars() {
            if c == '.' && next > 0 && words[next - 1] & DECIMAL_POINT == 0 {
                words[next - 1] |= DECIMAL_POINT;
                continue;
            }
            if next == DIGITS {
                break;
            }
            words[next] = glyph(c);
            next += 1;
        }
        self.buffer = words;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl ErrorType for RecordingBus {
        type Error = ErrorKind;
    }

    impl I2c for RecordingBus {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    fn display() -> Ht16k33<RecordingBus> {
        Ht16k33::new(RecordingBus::default(), 0x70, "/dev/i2c-1", 20).unwrap()
    }

    fn last_ram(display: &Ht16k33<RecordingBus>) -> Vec<u8> {
        display.i2c.writes.last().unwrap().1.clone()
    }

    #[test]
    fn test_init_sequence() {
        let mut d = display();
        d.set_enabled(true).unwrap();
        let cmds: Vec<Vec<u8>> = d.i2c.writes.iter().map(|(_, b)| b.clone()).collect();
        // brightness clamped to 15
        assert_eq!(cmds, vec![vec![0x21], vec![0xEF], vec![0x81]]);
        assert!(d.i2c.writes.iter().all(|(addr, _)| *addr == 0x70));
    }

    #[test]
    fn test_greeting_layout() {
        let mut d = display();
        d.clear().unwrap();
        d.display_char('H', 1, false).unwrap();
        d.display_char('I', 2, false).unwrap();
        let h = glyph('H').to_le_bytes();
        let i = glyph('I').to_le_bytes();
        assert_eq!(last_ram(&d), vec![0x00, 0, 0, h[0], h[1], i[0], i[1], 0, 0]);
    }

    #[test]
    fn test_dot_sets_bit_14() {
        let mut d = display();
        d.display_char('A', 0, true).unwrap();
        assert_eq!(d.buffer[0], glyph('A') | 0x4000);
    }

    #[test]
    fn test_position_out_of_range() {
        let mut d = display();
        assert!(matches!(
            d.display_char('A', 4, false),
            Err(PeripheralError::InvalidPosition(4))
        ));
    }

    #[test]
    fn test_text_fills_all_digits() {
        let mut d = display();
        d.display_text("!!!!").unwrap();
        assert_eq!(d.buffer, [glyph('!'); 4]);
    }

    #[test]
    fn test_text_folds_dots_and_blanks_rest() {
        let mut d = display();
        d.display_text("ABCD").unwrap();
        d.display_text("1.5").unwrap();
        assert_eq!(d.buffer, [glyph('1') | DECIMAL_POINT, glyph('5'), 0, 0]);
    }

    #[test]
    fn test_text_truncates() {
        let mut d = display();
        d.display_text("HELLO").unwrap();
        assert_eq!(d.buffer, [glyph('H'), glyph('E'), glyph('L'), glyph('L')]);
    }

    #[test]
    fn test_bus_failure_is_io_error() {
        let mut d = display();
        d.i2c.fail = true;
        assert!(matches!(d.clear(), Err(PeripheralError::Io { .. })));
    }

    #[test]
    fn test_unknown_char_is_blank() {
        assert_eq!(glyph('é'), 0);
        assert_eq!(glyph(' '), 0);
    }
}
