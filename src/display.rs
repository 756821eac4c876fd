//! # Drawing Surface
//!
//! The status panel draws through this trait and nothing else. The display
//! driver behind it (rasterization, fonts, bus traffic) lives outside this
//! crate and is assumed to be always available; calls are fire-and-forget.

/// Vector and text drawing primitives in screen pixel coordinates.
///
/// Only ever called from the idle task.
pub trait Canvas {
    /// Move the pen to (`x`, `y`) without drawing.
    fn move_cursor(&mut self, x: u16, y: u16);

    /// Draw a line from the pen to (`x`, `y`) and leave the pen there.
    fn draw_line_to(&mut self, x: u16, y: u16);

    /// Draw `text` with its top-left corner at (`x`, `y`), replacing
    /// whatever was underneath.
    fn draw_text(&mut self, x: u16, y: u16, text: &str);
}
