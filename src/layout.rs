use crate::error::Result;
use crate::grid::Grid;

pub const BASE_WIDTH: i32 = 1400;
pub const BASE_HEIGHT: i32 = 800;

/// Sizes the playfield to a viewport.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Layout {
    pub aspect_width: i32,
    pub aspect_height: i32,
    /// Share of the limiting viewport side the playfield may use.
    pub fill: f64,
    pub cell_size: i32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout { aspect_width: BASE_WIDTH, aspect_height: BASE_HEIGHT, fill: 0.95, cell_size: 25 }
    }
}

impl Layout {
    /// Largest playfield that fits `(width, height)` with the configured
    /// aspect ratio, rounded down to whole cells. Never smaller than one
    /// cell.
    pub fn fit(&self, width: i32, height: i32) -> Result<Grid> {
        let aspect = self.aspect_width as f64 / self.aspect_height as f64;
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);

        let (new_w, new_h) = if w / h > aspect {
            let new_h = (h * self.fill).floor();
            ((new_h * aspect).floor(), new_h)
        } else {
            let new_w = (w * self.fill).floor();
            (new_w, (new_w / aspect).floor())
        };

        let size = self.cell_size;
        let snap = |v: f64| ((v as i32) / size * size).max(size);
        Grid::new(snap(new_w), snap(new_h), size)
    }
}

/// Cell offset that keeps content centred when the grid changes size.
pub fn recentre_offset(old: &Grid, new: &Grid) -> (i32, i32) {
    ((new.cols() - old.cols()) / 2, (new.rows() - old.rows()) / 2)
}
