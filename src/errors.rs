//! The ways a render can fail.  Configuration problems are caught
//! before any worker thread starts; worker problems are caught after
//! the collection pass has drained every signal it is going to get.
//! Numeric trouble inside the iteration loop is *not* an error: the
//! evaluator degrades it to a defined escape value on the spot.

/// Errors reported by renderer construction and the render passes.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// A parameter failed validation before computation started.  No
    /// work has been done and no image is produced.
    #[fail(display = "invalid configuration: {}", _0)]
    Configuration(String),

    /// A worker terminated without delivering all of its rows.  The
    /// partial buffer is discarded rather than emitted as a corrupted
    /// image.
    #[fail(display = "worker failure: {}", _0)]
    Worker(String),

    /// The cancellation flag was raised before the render finished.
    #[fail(display = "render cancelled before completion")]
    Cancelled,
}
