//! Rectangle transforms from an annotation media box into the page box
//! declared by the PostScript document.

use crate::error::{PsMarkError, Result};

/// Axis-aligned rectangle as `[x0, y0, x1, y1]`.
pub type Rect = [f64; 4];

/// Mapping from media-box coordinates into page coordinates.
///
/// Points are first offset by `(add_x, add_y)` and then multiplied by
/// `scale`. When `rotate90` is set, each point is rotated a quarter turn
/// around the center of `reference_box` before the offset is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub add_x: f64,
    pub add_y: f64,
    pub scale: f64,
    pub rotate90: bool,
    pub reference_box: Rect,
}

impl Transform {
    /// Transform both corners of `rect`.
    ///
    /// Rotation swaps the horizontal ordering of the corners, so the two
    /// x coordinates are exchanged afterwards to keep `x0` on the left.
    pub fn apply(&self, rect: &Rect) -> Rect {
        let (x0, y0) = self.apply_point(rect[0], rect[1]);
        let (x1, y1) = self.apply_point(rect[2], rect[3]);
        if self.rotate90 {
            [x1, y0, x0, y1]
        } else {
            [x0, y0, x1, y1]
        }
    }

    /// Transform a single point.
    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        let (mut x, mut y) = (x, y);
        if self.rotate90 {
            let mb = &self.reference_box;
            let cx = 0.5 * (mb[0] + mb[2]);
            let cy = 0.5 * (mb[1] + mb[3]);
            let (dx, dy) = (x - cx, y - cy);
            x = -dy + cy;
            y = dx + cx;
        }
        ((x + self.add_x) * self.scale, (y + self.add_y) * self.scale)
    }
}

fn is_landscape(width: f64, height: f64) -> bool {
    width / height > 1.0
}

/// Build the transform that fits `media_box` onto a `page_width` by
/// `page_height` page.
///
/// Boxes of matching orientation are scaled to the page width and centered
/// vertically. Boxes whose orientation differs are rotated, scaled to the
/// page height and centered horizontally.
pub fn compute_transform(page_width: f64, page_height: f64, media_box: &Rect) -> Result<Transform> {
    let mb_width = media_box[2] - media_box[0];
    let mb_height = media_box[3] - media_box[1];
    if !(mb_width > 0.0 && mb_height > 0.0) || !media_box.iter().all(|v| v.is_finite()) {
        return Err(PsMarkError::DegenerateMediaBox {
            x0: media_box[0],
            y0: media_box[1],
            x1: media_box[2],
            y1: media_box[3],
        });
    }

    let mid_y = media_box[1] + media_box[3];
    let transform = if is_landscape(mb_width, mb_height) != is_landscape(page_width, page_height) {
        let scale = page_height / mb_width;
        let media_mid = mid_y * scale * 0.5;
        Transform {
            add_x: (page_width * 0.5 - media_mid) / scale,
            add_y: 0.0,
            scale,
            rotate90: true,
            reference_box: *media_box,
        }
    } else {
        let scale = page_width / mb_width;
        let media_mid = mid_y * scale * 0.5;
        Transform {
            add_x: 0.0,
            add_y: (page_height * 0.5 - media_mid) / scale,
            scale,
            rotate90: false,
            reference_box: *media_box,
        }
    };
    Ok(transform)
}
