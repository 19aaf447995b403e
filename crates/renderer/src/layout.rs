//! Placement of the plot area on the canvas.

use alert_common::PlanarBounds;
use tiny_skia::Rect;

/// Subplot margins as fractions of the canvas (left, right, bottom, top).
const MARGINS: (f32, f32, f32, f32) = (0.125, 0.9, 0.11, 0.88);

/// The rectangle the map is drawn in, in canvas pixels (y down).
///
/// The margin box is shrunk so one meter is the same number of pixels on
/// both axes, then centered in the original box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    view: PlanarBounds,
}

impl PlotArea {
    pub fn fit(canvas_width: u32, canvas_height: u32, view: PlanarBounds) -> Self {
        let (l, r, b, t) = MARGINS;
        let cw = canvas_width as f32;
        let ch = canvas_height as f32;

        let box_left = l * cw;
        let box_top = (1.0 - t) * ch;
        let box_width = (r - l) * cw;
        let box_height = (t - b) * ch;

        let aspect = (view.height() / view.width()) as f32;
        let (width, height) = if box_height / box_width > aspect {
            (box_width, box_width * aspect)
        } else {
            (box_height / aspect, box_height)
        };

        Self {
            left: box_left + (box_width - width) / 2.0,
            top: box_top + (box_height - height) / 2.0,
            width,
            height,
            view,
        }
    }

    /// Planar map coordinates to canvas pixels.
    pub fn project(&self, x: f64, y: f64) -> (f32, f32) {
        let fx = (x - self.view.x_min) / self.view.width();
        let fy = (self.view.y_max - y) / self.view.height();
        (
            self.left + fx as f32 * self.width,
            self.top + fy as f32 * self.height,
        )
    }

    /// Plot-relative position ((0, 0) lower-left, (1, 1) upper-right) to pixels.
    pub fn relative(&self, fx: f32, fy: f32) -> (f32, f32) {
        (self.left + fx * self.width, self.top + (1.0 - fy) * self.height)
    }

    pub fn rect(&self) -> Option<Rect> {
        Rect::from_xywh(self.left, self.top, self.width, self.height)
    }
}
