//! Contains the PlaneMapper struct, which ties the integral pixel
//! plane of the output image to the rectangle of the complex plane
//! being rendered, and maps pixel coordinates to complex points.  The
//! mapping runs in one direction only; nothing in an escape-time
//! render ever needs to go from a point back to a pixel.

use errors::RenderError;
use num::complex::Complex;

/// The pixel dimensions of the output image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridSpec {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

/// The rectangle of the complex plane being rendered: the real axis
/// spans [re_min, re_max], the imaginary axis [im_min, im_max].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneBounds {
    /// Left edge on the real axis.
    pub re_min: f64,
    /// Right edge on the real axis.
    pub re_max: f64,
    /// Bottom edge on the imaginary axis.
    pub im_min: f64,
    /// Top edge on the imaginary axis.
    pub im_max: f64,
}

impl PlaneBounds {
    /// Build bounds from the left-lower and right-upper corners of
    /// the rectangle, the way they arrive from the command line.
    pub fn from_corners(leftlower: Complex<f64>, rightupper: Complex<f64>) -> PlaneBounds {
        PlaneBounds {
            re_min: leftlower.re,
            re_max: rightupper.re,
            im_min: leftlower.im,
            im_max: rightupper.im,
        }
    }
}

/// Ties a pixel grid to a rectangle of the complex plane.  Both are
/// validated at construction and immutable afterward; every worker
/// shares one mapper by reference for the whole computation.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The pixel dimensions of the image.
    pub grid: GridSpec,
    /// The complex-plane window.
    pub bounds: PlaneBounds,
}

impl PlaneMapper {
    /// Constructor.  Rejects empty grids and degenerate, inverted, or
    /// non-finite plane bounds; a mapper that exists is usable.
    pub fn new(grid: GridSpec, bounds: PlaneBounds) -> Result<PlaneMapper, RenderError> {
        if grid.width == 0 || grid.height == 0 {
            return Err(RenderError::Configuration(format!(
                "image dimensions must be at least 1x1, got {}x{}",
                grid.width, grid.height
            )));
        }
        let edges = [bounds.re_min, bounds.re_max, bounds.im_min, bounds.im_max];
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(RenderError::Configuration(
                "plane bounds must be finite".to_string(),
            ));
        }
        if bounds.re_min >= bounds.re_max {
            return Err(RenderError::Configuration(format!(
                "the left edge of the real axis ({}) is not left of the right edge ({})",
                bounds.re_min, bounds.re_max
            )));
        }
        if bounds.im_min >= bounds.im_max {
            return Err(RenderError::Configuration(format!(
                "the bottom edge of the imaginary axis ({}) is not below the top edge ({})",
                bounds.im_min, bounds.im_max
            )));
        }
        Ok(PlaneMapper { grid, bounds })
    }

    /// The total number of pixels in the image.  Used to size the
    /// result buffer.
    pub fn len(&self) -> usize {
        self.grid.width * self.grid.height
    }

    /// True when the grid holds no pixels.  Construction forbids
    /// this, so on a live mapper it is always false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Given the column and row of a pixel, return the corresponding
    /// point on the complex plane.  The pixel y axis grows downward
    /// while the imaginary axis grows upward, so row py maps through
    /// (height - py): row 0 is the top of the image and carries the
    /// largest imaginary values.
    pub fn pixel_to_point(&self, px: usize, py: usize) -> Complex<f64> {
        let b = &self.bounds;
        Complex::new(
            b.re_min + (b.re_max - b.re_min) * (px as f64) / (self.grid.width as f64),
            b.im_min
                + (b.im_max - b.im_min) * ((self.grid.height - py) as f64)
                    / (self.grid.height as f64),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(w: usize, h: usize) -> PlaneMapper {
        PlaneMapper::new(
            GridSpec {
                width: w,
                height: h,
            },
            PlaneBounds {
                re_min: -2.0,
                re_max: 1.0,
                im_min: -1.0,
                im_max: 1.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn mapper_fails_on_empty_grid() {
        let bounds = PlaneBounds {
            re_min: -2.0,
            re_max: 1.0,
            im_min: -1.0,
            im_max: 1.0,
        };
        assert!(PlaneMapper::new(GridSpec { width: 0, height: 4 }, bounds).is_err());
        assert!(PlaneMapper::new(GridSpec { width: 4, height: 0 }, bounds).is_err());
    }

    #[test]
    fn mapper_fails_on_inverted_bounds() {
        let grid = GridSpec {
            width: 4,
            height: 4,
        };
        let flipped = PlaneBounds {
            re_min: 1.0,
            re_max: -2.0,
            im_min: -1.0,
            im_max: 1.0,
        };
        assert!(PlaneMapper::new(grid, flipped).is_err());
        let degenerate = PlaneBounds {
            re_min: -2.0,
            re_max: 1.0,
            im_min: 0.5,
            im_max: 0.5,
        };
        assert!(PlaneMapper::new(grid, degenerate).is_err());
    }

    #[test]
    fn mapper_fails_on_non_finite_bounds() {
        let grid = GridSpec {
            width: 4,
            height: 4,
        };
        let bounds = PlaneBounds {
            re_min: f64::NEG_INFINITY,
            re_max: 1.0,
            im_min: -1.0,
            im_max: 1.0,
        };
        assert!(PlaneMapper::new(grid, bounds).is_err());
    }

    #[test]
    fn leftmost_column_sits_on_the_left_edge() {
        let pm = mapper(4, 4);
        assert_eq!(pm.pixel_to_point(0, 2).re, -2.0);
        // The right edge is exclusive: column width-1 stops short.
        assert!(pm.pixel_to_point(3, 2).re < 1.0);
    }

    #[test]
    fn pixel_y_axis_is_inverted() {
        let pm = mapper(4, 4);
        // Row 0 is the top of the image: the largest imaginary value.
        assert_eq!(pm.pixel_to_point(0, 0).im, 1.0);
        assert!(pm.pixel_to_point(0, 3).im < pm.pixel_to_point(0, 0).im);
        assert_eq!(pm.pixel_to_point(0, 2).im, 0.0);
    }

    #[test]
    fn columns_advance_linearly() {
        let pm = mapper(4, 4);
        assert_eq!(pm.pixel_to_point(1, 0).re, -1.25);
        assert_eq!(pm.pixel_to_point(2, 0).re, -0.5);
        assert_eq!(pm.pixel_to_point(3, 0).re, 0.25);
    }

    #[test]
    fn from_corners_matches_the_fields() {
        let b = PlaneBounds::from_corners(Complex::new(-2.0, -1.0), Complex::new(1.0, 1.0));
        assert_eq!(b.re_min, -2.0);
        assert_eq!(b.re_max, 1.0);
        assert_eq!(b.im_min, -1.0);
        assert_eq!(b.im_max, 1.0);
    }
}
