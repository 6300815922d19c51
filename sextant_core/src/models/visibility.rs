// sextant_core/src/models/visibility.rs

use nalgebra::{DVector, Vector2, Vector4};

use crate::platform::ImageSize;

/// A point measurement is visible when it lies in front of the sensor and its
/// first two components fall inside the image.
pub fn is_visible(e: &DVector<f64>, depth: f64, image: &ImageSize) -> bool {
    e.len() >= 2 && depth > 0.0 && image.contains(&Vector2::new(e[0], e[1]))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentVisibility {
    pub visible: bool,
    /// The part of the segment inside the image, when there is one.
    pub clipped: Option<Vector4<f64>>,
}

/// Visibility of a projected segment `[u1; v1; u2; v2]` with endpoint depths.
///
/// Both endpoints must be in front of the sensor and some part of the segment
/// must cross the image rectangle.
pub fn visible_segment(segment: &Vector4<f64>, depths: &Vector2<f64>, image: &ImageSize) -> SegmentVisibility {
    if depths.iter().any(|d| *d <= 0.0) {
        return SegmentVisibility {
            visible: false,
            clipped: None,
        };
    }
    let clipped = clip_to_image(segment, image);
    SegmentVisibility {
        visible: clipped.is_some(),
        clipped,
    }
}

/// Liang–Barsky clipping of a 2D segment against `[0, width] × [0, height]`.
fn clip_to_image(segment: &Vector4<f64>, image: &ImageSize) -> Option<Vector4<f64>> {
    let (x0, y0, x1, y1) = (segment[0], segment[1], segment[2], segment[3]);
    let (dx, dy) = (x1 - x0, y1 - y0);

    let mut t_in = 0.0_f64;
    let mut t_out = 1.0_f64;
    let edges = [
        (-dx, x0),
        (dx, image.width - x0),
        (-dy, y0),
        (dy, image.height - y0),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge: either fully inside its half-plane or fully out.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t_in = t_in.max(t);
        } else {
            t_out = t_out.min(t);
        }
        if t_in > t_out {
            return None;
        }
    }

    Some(Vector4::new(
        x0 + t_in * dx,
        y0 + t_in * dy,
        x0 + t_out * dx,
        y0 + t_out * dy,
    ))
}
