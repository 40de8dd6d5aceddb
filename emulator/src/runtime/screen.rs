use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// What happens to sprite pixels past the screen edge.
///
/// Historical interpreters disagree here, so the behavior is an explicit
/// policy rather than a silent choice. The sprite *origin* always wraps
/// (x mod 64, y mod 32); this only governs pixels that run off the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpriteEdge {
    /// Drop pixels that fall outside the screen
    #[default]
    Clip,

    /// Wrap pixels around to the opposite edge
    Wrap,
}

/// The 64×32 monochrome framebuffer.
///
/// Sprites are XOR-composited; the dirty flag tells the host a new frame
/// should be presented and is consumed with [`Screen::take_dirty`].
#[derive(Clone, PartialEq, Eq)]
pub struct Screen {
    pixels: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            // The host should present the initial blank frame
            dirty: true,
        }
    }
}

impl Screen {
    /// Turn every pixel off and mark the frame dirty
    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// Whether the pixel at (x, y) is lit
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y][x]
    }

    /// Consume the dirty flag, returning whether a re-present is due
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// XOR-blit a sprite of one byte per row at (x, y).
    ///
    /// The origin wraps on both axes; pixels past the edge follow the given
    /// [`SpriteEdge`] policy. Returns `true` if any previously-lit pixel was
    /// turned off, which is the vF collision condition.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8], edge: SpriteEdge) -> bool {
        let origin_x = usize::from(x) % DISPLAY_WIDTH;
        let origin_y = usize::from(y) % DISPLAY_HEIGHT;

        let mut collision = false;
        for (row_offset, row) in rows.iter().enumerate() {
            let Some(py) = Self::project(origin_y + row_offset, DISPLAY_HEIGHT, edge) else {
                continue;
            };

            for bit in 0..8 {
                if row & (0x80 >> bit) == 0 {
                    continue;
                }
                let Some(px) = Self::project(origin_x + bit, DISPLAY_WIDTH, edge) else {
                    continue;
                };

                let pixel = &mut self.pixels[py][px];
                collision |= *pixel;
                *pixel ^= true;
            }
        }

        self.dirty = true;
        collision
    }

    fn project(coordinate: usize, limit: usize, edge: SpriteEdge) -> Option<usize> {
        match edge {
            SpriteEdge::Clip if coordinate >= limit => None,
            SpriteEdge::Clip => Some(coordinate),
            SpriteEdge::Wrap => Some(coordinate % limit),
        }
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Screen {{ dirty: {}, [...] }}", self.dirty)
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.pixels {
            for &pixel in row {
                f.write_str(if pixel { "█" } else { "·" })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprites_are_xor_composited() {
        let mut screen = Screen::default();
        // One row, all 8 bits set
        assert!(!screen.draw_sprite(0, 0, &[0xFF], SpriteEdge::Clip));
        assert!(screen.pixel(0, 0) && screen.pixel(7, 0));

        // Drawing the same sprite again erases it and reports the collision
        assert!(screen.draw_sprite(0, 0, &[0xFF], SpriteEdge::Clip));
        assert_eq!(screen, {
            let mut blank = Screen::default();
            blank.dirty = true;
            blank
        });
    }

    #[test]
    fn origin_wraps_regardless_of_edge_policy() {
        let mut screen = Screen::default();
        screen.draw_sprite(64, 32, &[0x80], SpriteEdge::Clip);
        assert!(screen.pixel(0, 0));
    }

    #[test]
    fn clip_drops_pixels_past_the_edge() {
        let mut screen = Screen::default();
        screen.draw_sprite(62, 31, &[0xC0, 0xC0], SpriteEdge::Clip);
        assert!(screen.pixel(62, 31) && screen.pixel(63, 31));
        // Nothing wrapped to the left column or the top row
        assert!(!screen.pixel(0, 31));
        assert!(!screen.pixel(62, 0));
    }

    #[test]
    fn wrap_carries_pixels_to_the_opposite_edge() {
        let mut screen = Screen::default();
        screen.draw_sprite(62, 31, &[0xC0, 0xC0], SpriteEdge::Wrap);
        assert!(screen.pixel(62, 31) && screen.pixel(63, 31));
        assert!(screen.pixel(62, 0) && screen.pixel(63, 0));
        assert!(screen.pixel(0, 31) && screen.pixel(0, 0));
    }

    #[test]
    fn clear_resets_pixels_and_marks_dirty() {
        let mut screen = Screen::default();
        screen.draw_sprite(10, 10, &[0xFF], SpriteEdge::Clip);
        screen.take_dirty();
        screen.clear();
        assert!(!screen.pixel(10, 10));
        assert!(screen.take_dirty());
        assert!(!screen.take_dirty(), "take_dirty consumes the flag");
    }

    #[test]
    fn rendering_a_font_glyph() {
        let mut screen = Screen::default();
        // The built-in "1" glyph
        screen.draw_sprite(1, 1, &[0x20, 0x60, 0x20, 0x20, 0x70], SpriteEdge::Clip);
        let rendered: String = screen
            .to_string()
            .lines()
            .take(7)
            .map(|line| line.chars().take(8).chain(['\n']).collect::<String>())
            .collect();
        insta::assert_snapshot!(rendered, @r"
        ········
        ···█····
        ··██····
        ···█····
        ···█····
        ··███···
        ········
        ");
    }
}
