//! Tile layout heuristic for the stream grid.
//!
//! The page script performs this search in the browser on every resize;
//! the same constants feed both the generated script and `best_fit`.

/// Fixed layout constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    /// Space reserved around the grid, in pixels.
    pub margin_px: u32,
    /// Width of the chat panel when open, in pixels.
    pub chat_width_px: u32,
    /// Tile aspect ratio width term.
    pub aspect_width: u32,
    /// Tile aspect ratio height term.
    pub aspect_height: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            margin_px: 8,
            chat_width_px: 350,
            aspect_width: 16,
            aspect_height: 9,
        }
    }
}

/// Size applied to every stream frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
    /// Column count that produced this size; 0 when nothing fits.
    pub columns: u32,
}

impl LayoutParams {
    /// Find the largest tile for `count` frames in the given viewport.
    ///
    /// Every column count from 1 to `count` is tried; rows are
    /// `ceil(count / columns)`. Each candidate is clamped to the aspect ratio
    /// and the widest one wins (first one on ties).
    pub fn best_fit(
        &self,
        count: u32,
        viewport_width: u32,
        viewport_height: u32,
        chat_open: bool,
    ) -> TileSize {
        let chat = if chat_open { self.chat_width_px } else { 0 };
        let width = i64::from(viewport_width) - i64::from(self.margin_px) - i64::from(chat);
        let height = i64::from(viewport_height) - i64::from(self.margin_px);
        let (aw, ah) = (i64::from(self.aspect_width), i64::from(self.aspect_height));

        let mut best = TileSize::default();
        for columns in 1..=i64::from(count) {
            let rows = (i64::from(count) + columns - 1) / columns;
            let mut max_width = width.div_euclid(columns);
            let mut max_height = height.div_euclid(rows);

            if max_width * ah < max_height * aw {
                max_height = (max_width * ah).div_euclid(aw);
            } else {
                max_width = (max_height * aw).div_euclid(ah);
            }

            if max_width > i64::from(best.width) {
                best = TileSize {
                    width: max_width as u32,
                    height: max_height.max(0) as u32,
                    columns: columns as u32,
                };
            }
        }

        best
    }
}
