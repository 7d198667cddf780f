//! Chase animation: a green bar that grows to the end of the strip, then shrinks back.

use smart_leds::RGB8;

pub const STRIP_LEN: usize = 7;

pub const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chase {
    position: usize,
    direction: Direction,
}

impl Chase {
    pub fn new() -> Self {
        Chase {
            position: 0,
            direction: Direction::Ascending,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// LEDs up to and including `position` are green, the rest off.
    pub fn frame(&self) -> [RGB8; STRIP_LEN] {
        let mut colors = [OFF; STRIP_LEN];
        for (i, color) in colors.iter_mut().enumerate() {
            if i <= self.position {
                *color = GREEN;
            }
        }
        colors
    }

    /// Move the lit boundary one step, turning around at either end.
    /// The end positions are held for one extra tick on each turn.
    pub fn advance(&mut self) {
        match self.direction {
            Direction::Ascending => {
                if self.position + 1 == STRIP_LEN {
                    self.direction = Direction::Descending;
                } else {
                    self.position += 1;
                }
            }
            Direction::Descending => {
                if self.position == 0 {
                    self.direction = Direction::Ascending;
                } else {
                    self.position -= 1;
                }
            }
        }
    }
}

impl Default for Chase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(frame: &[RGB8]) -> usize {
        frame.iter().filter(|c| **c == GREEN).count()
    }

    #[test]
    fn test_starts_at_zero_ascending() {
        let chase = Chase::new();
        assert_eq!(chase.position(), 0);
        assert_eq!(chase.direction(), Direction::Ascending);
        assert_eq!(lit(&chase.frame()), 1);
        assert_eq!(chase.frame()[0], GREEN);
    }

    #[test]
    fn test_ascending_step_grows_bar() {
        let mut chase = Chase::new();
        for expected in 1..STRIP_LEN {
            chase.advance();
            assert_eq!(chase.position(), expected);
            assert_eq!(chase.direction(), Direction::Ascending);
            let frame = chase.frame();
            for (i, color) in frame.iter().enumerate() {
                assert_eq!(*color == GREEN, i <= expected, "led {} at position {}", i, expected);
            }
        }
    }

    #[test]
    fn test_turns_at_top() {
        let mut chase = Chase { position: 6, direction: Direction::Ascending };
        chase.advance();
        assert_eq!(chase.position(), 6);
        assert_eq!(chase.direction(), Direction::Descending);
    }

    #[test]
    fn test_turns_at_bottom() {
        let mut chase = Chase { position: 0, direction: Direction::Descending };
        chase.advance();
        assert_eq!(chase.position(), 0);
        assert_eq!(chase.direction(), Direction::Ascending);
    }

    #[test]
    fn test_position_sequence() {
        let mut chase = Chase::new();
        let mut positions = Vec::new();
        for _ in 0..15 {
            positions.push(chase.position());
            chase.advance();
        }
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5, 6, 6, 5, 4, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        let mut chase = Chase::new();
        // 0..6 up, hold at 6, 6..0 down, hold at 0
        for _ in 0..14 {
            chase.advance();
        }
        assert_eq!(chase, Chase::new());
    }
}
