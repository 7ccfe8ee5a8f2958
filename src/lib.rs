#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the collection of points c on the complex
//! plane for which the recurrence z ← z² + c, starting from zero,
//! never runs off to infinity.  For every pixel of the target image we
//! map the pixel to a point on the plane and count how many iterations
//! it takes for the orbit to escape a bailout radius; that "escape
//! time" picks a color out of a palette.  Points that never escape
//! within the iteration budget are members of the set and get a fixed
//! color of their own.
//!
//! Two refinements keep the output pretty and the computation honest.
//! The integer escape time produces visible bands of color, so the
//! count is smoothed into a fractional value with a logarithmic
//! correction, and the palette is interpolated between neighboring
//! entries.  And since most of the cost hides in the points that
//! *don't* escape, the two largest interior regions (the main cardioid
//! and the period-2 bulb) are detected by closed-form tests before any
//! iteration happens at all.
//!
//! The image is computed by a fixed pool of worker threads.  Rows are
//! dealt out in a stripe pattern, row i belonging to worker i mod n,
//! so the expensive rows near the set's boundary spread across all
//! workers instead of landing on one of them.  Workers send finished
//! rows over a channel to a collector that assembles them into the
//! final buffer in row order, however late or early each one arrives.

extern crate crossbeam;
extern crate image;
extern crate num;
extern crate num_cpus;
#[macro_use]
extern crate failure;
#[cfg(test)]
#[macro_use]
extern crate itertools;

pub mod errors;
pub mod escape;
pub mod palette;
pub mod planes;
pub mod render;

pub use errors::RenderError;
pub use escape::EscapeValue;
pub use palette::{Palette, Rgb};
pub use planes::{GridSpec, PlaneBounds, PlaneMapper};
pub use render::{partition, Renderer, WorkerAssignment};
