use crate::color::Chip8Color;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

const PIXEL_ON: u8 = 0xFF;
const PIXEL_OFF: u8 = 0x00;

/// Monochrome 64x32 framebuffer, one byte per pixel (0x00 off, 0xFF on)
pub struct Display {
    buffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// Set when the buffer changes, cleared by the renderer
    dirty: bool,
    /// Pixels dropped past the right or bottom edge
    clipped: u64,
}

impl Display {
    pub fn new() -> Display {
        Display {
            buffer: [PIXEL_OFF; SCREEN_WIDTH * SCREEN_HEIGHT],
            dirty: true,
            clipped: 0,
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buffer.iter_mut().for_each(|p| *p = PIXEL_OFF);
        self.dirty = true;
    }

    /// XOR `bit` into the pixel at (x, y) and return true if that erased a lit
    /// pixel. Coordinates outside the screen are clipped.
    pub fn write(&mut self, x: usize, y: usize, bit: bool) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            self.clipped += 1;
            log::trace!("clipped pxl at x:{} y:{}", x, y);
            return false;
        }

        if !bit {
            return false;
        }

        let idx = y * SCREEN_WIDTH + x;
        let was_set = self.buffer[idx] != PIXEL_OFF;
        self.buffer[idx] = if was_set { PIXEL_OFF } else { PIXEL_ON };
        self.dirty = true;
        was_set
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.buffer[y * SCREEN_WIDTH + x] != PIXEL_OFF
    }

    /// Row major view of the framebuffer
    pub fn data(&self) -> &[u8] {
        &self.buffer[..]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn clipped_pixels(&self) -> u64 {
        self.clipped
    }

    /// Expand the framebuffer into one colour per pixel for upload to a texture
    pub fn render_into(&self, fg: Chip8Color, bg: Chip8Color, out: &mut [Chip8Color]) {
        assert_eq!(
            out.len(),
            SCREEN_WIDTH * SCREEN_HEIGHT,
            "Output buffer must hold one colour per pixel"
        );

        for (dst, &pxl) in out.iter_mut().zip(self.buffer.iter()) {
            *dst = if pxl != PIXEL_OFF { fg } else { bg };
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Display::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sets_and_erases() {
        // Arrange
        let mut display = Display::new();

        // Act + Assert: first write lights the pixel
        assert!(!display.write(3, 4, true));
        assert!(display.pixel(3, 4));
        assert_eq!(display.data()[4 * SCREEN_WIDTH + 3], 0xFF);

        // Act + Assert: second write erases it and reports it
        assert!(display.write(3, 4, true));
        assert!(!display.pixel(3, 4));
        assert_eq!(display.data()[4 * SCREEN_WIDTH + 3], 0x00);
    }

    #[test]
    fn test_write_zero_bit_is_noop() {
        let mut display = Display::new();
        display.write(0, 0, true);

        assert!(!display.write(0, 0, false));
        assert!(display.pixel(0, 0));
    }

    #[test]
    fn test_write_out_of_bounds_is_clipped() {
        // Arrange
        let mut display = Display::new();

        // Act
        let erased = display.write(SCREEN_WIDTH, 0, true) | display.write(0, SCREEN_HEIGHT, true);

        // Assert
        assert!(!erased);
        assert!(display.data().iter().all(|&p| p == 0));
        assert_eq!(display.clipped_pixels(), 2);
    }

    #[test]
    fn test_clear() {
        let mut display = Display::new();
        for x in 0..SCREEN_WIDTH {
            display.write(x, x % SCREEN_HEIGHT, true);
        }
        display.mark_clean();

        display.clear();

        assert!(display.data().iter().all(|&p| p == 0));
        assert!(display.is_dirty());
    }

    #[test]
    fn test_dirty_flag() {
        let mut display = Display::new();
        display.mark_clean();

        display.write(70, 0, true);
        assert!(!display.is_dirty(), "clipped write must not dirty the display");

        display.write(1, 1, true);
        assert!(display.is_dirty());
    }

    #[test]
    fn test_render_into() {
        // Arrange
        let mut display = Display::new();
        display.write(1, 0, true);
        let fg = Chip8Color::new(0xAA, 0xBB, 0xCC);
        let bg = Chip8Color::new(0x01, 0x02, 0x03);
        let mut out = vec![Chip8Color::new(0, 0, 0); SCREEN_WIDTH * SCREEN_HEIGHT];

        // Act
        display.render_into(fg, bg, &mut out);

        // Assert
        assert_eq!(out[0], bg);
        assert_eq!(out[1], fg);
        assert_eq!(out[SCREEN_WIDTH + 1], bg);
    }
}
