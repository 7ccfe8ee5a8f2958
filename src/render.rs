//! The parallel render pass.  A fixed pool of worker threads splits
//! the image by row: worker i of n owns rows i, i+n, i+2n, and so on.
//! The stripe pattern matters because the cost of a row depends on
//! how much of the set's boundary it crosses; striping spreads the
//! expensive boundary-dense rows across every worker instead of
//! handing one worker a solid block of them.
//!
//! Workers never share the output.  Each finished row travels over a
//! channel to a collector on the spawning thread, which writes it
//! into its slot of the pre-sized buffer and counts per-worker
//! completion signals.  The buffer is released only when every worker
//! has signalled; a worker that dies early comes up short in the
//! count and turns the whole render into an error rather than a
//! silently corrupted image.

use crossbeam::channel;
use errors::RenderError;
use escape::{self, EscapeValue};
use planes::{GridSpec, PlaneBounds, PlaneMapper};
use std::cmp;
use std::sync::atomic::{AtomicBool, Ordering};

/// The set of rows one worker owns: start_row, start_row + row_stride,
/// start_row + 2·row_stride, … up to the image height.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorkerAssignment {
    /// Index of the worker, in [0, worker count).
    pub worker: usize,
    /// First row this worker computes.
    pub start_row: usize,
    /// Distance between consecutive rows; equal to the worker count.
    pub row_stride: usize,
}

impl WorkerAssignment {
    /// The rows of this assignment, in increasing order.  Empty when
    /// start_row is already past the image height.
    pub fn rows(&self, height: usize) -> impl Iterator<Item = usize> {
        (self.start_row..height).step_by(self.row_stride)
    }
}

/// Deal the rows of an image out to `workers` workers in stripes.
/// The union of the assignments is exactly [0, height), each row
/// appearing in exactly one of them.  More workers than rows is fine;
/// the surplus workers receive empty assignments.
pub fn partition(height: usize, workers: usize) -> Vec<WorkerAssignment> {
    (0..workers)
        .map(|worker| WorkerAssignment {
            worker,
            // A surplus worker's stripe would begin below the image;
            // pin it to the bottom edge so it owns the empty set.
            start_row: cmp::min(worker, height),
            row_stride: workers,
        })
        .collect()
}

enum WorkerMessage {
    // Advisory progress note; correctness never depends on it.
    Started { row: usize },
    Row { row: usize, values: Vec<EscapeValue> },
    Done { worker: usize },
}

/// Owns the immutable render configuration: the plane mapping and the
/// iteration budget.  Everything is validated in the constructor and
/// shared read-only with every worker; nothing here mutates once a
/// render starts.
pub struct Renderer {
    mapper: PlaneMapper,
    iterations: usize,
}

impl Renderer {
    /// Constructor.  Requires the pixel grid, the complex-plane
    /// window, and the per-pixel iteration budget.  Every
    /// configuration problem is caught here, before any worker ever
    /// starts.
    pub fn new(
        grid: GridSpec,
        bounds: PlaneBounds,
        iterations: usize,
    ) -> Result<Renderer, RenderError> {
        if iterations == 0 {
            return Err(RenderError::Configuration(
                "iteration budget must be at least 1".to_string(),
            ));
        }
        let mapper = PlaneMapper::new(grid, bounds)?;
        Ok(Renderer { mapper, iterations })
    }

    /// The pixel dimensions of the image being rendered.
    pub fn grid(&self) -> GridSpec {
        self.mapper.grid
    }

    /// Evaluate every pixel of one row, left to right.  Pure: the row
    /// comes back as a value and no shared state is touched, which is
    /// what lets workers run this without any locking.
    pub fn compute_row(&self, py: usize) -> Vec<EscapeValue> {
        (0..self.mapper.grid.width)
            .map(|px| escape::evaluate(self.mapper.pixel_to_point(px, py), self.iterations))
            .collect()
    }

    /// The single-threaded render: every row in order, no workers, no
    /// channel.  Produces a buffer bit-identical to the parallel
    /// render's.
    pub fn render_single(&self) -> Vec<EscapeValue> {
        let mut buffer = Vec::with_capacity(self.mapper.len());
        for py in 0..self.mapper.grid.height {
            buffer.extend(self.compute_row(py));
        }
        buffer
    }

    /// Render with `workers` parallel workers.  The buffer comes back
    /// in row-major order, row 0 first, whatever order the workers
    /// finished in.
    pub fn render(&self, workers: usize) -> Result<Vec<EscapeValue>, RenderError> {
        self.render_cancellable(workers, &AtomicBool::new(false))
    }

    /// Render with `workers` parallel workers and a cancellation
    /// flag.  Workers poll the flag between rows, not between pixels,
    /// so cancellation costs nothing on the hot path and takes effect
    /// within a row's worth of work.  A cancelled render returns
    /// `RenderError::Cancelled`; no partial buffer escapes.
    pub fn render_cancellable(
        &self,
        workers: usize,
        cancel: &AtomicBool,
    ) -> Result<Vec<EscapeValue>, RenderError> {
        if workers == 0 {
            return Err(RenderError::Configuration(
                "worker count must be at least 1".to_string(),
            ));
        }

        let width = self.mapper.grid.width;
        let height = self.mapper.grid.height;
        let assignments = partition(height, workers);
        let (sender, receiver) = channel::unbounded();

        let collected = crossbeam::scope(|spawner| {
            for assignment in &assignments {
                let sender = sender.clone();
                spawner.spawn(move |_| {
                    for py in assignment.rows(height) {
                        if cancel.load(Ordering::Relaxed) {
                            break;
                        }
                        let _ = sender.send(WorkerMessage::Started { row: py });
                        let values = self.compute_row(py);
                        if sender
                            .send(WorkerMessage::Row { row: py, values })
                            .is_err()
                        {
                            return;
                        }
                    }
                    let _ = sender.send(WorkerMessage::Done {
                        worker: assignment.worker,
                    });
                });
            }
            // The workers hold the only remaining clones; once they
            // are gone the receiver runs dry and the loop below ends.
            drop(sender);

            let mut buffer = vec![EscapeValue::Member; width * height];
            let mut rows_received = 0;
            let mut done = vec![false; workers];
            for message in receiver.iter() {
                match message {
                    WorkerMessage::Started { row } => debug_assert!(row < height),
                    WorkerMessage::Row { row, values } => {
                        buffer[row * width..(row + 1) * width].copy_from_slice(&values);
                        rows_received += 1;
                    }
                    WorkerMessage::Done { worker } => done[worker] = true,
                }
            }
            let signalled = done.iter().filter(|d| **d).count();
            (buffer, rows_received, signalled)
        });

        let (buffer, rows_received, signalled) = match collected {
            Ok(result) => result,
            Err(_) => {
                return Err(RenderError::Worker(
                    "a worker panicked before completing its rows".to_string(),
                ));
            }
        };
        if cancel.load(Ordering::Relaxed) {
            return Err(RenderError::Cancelled);
        }
        if signalled != workers {
            return Err(RenderError::Worker(format!(
                "expected completion signals from {} workers, received {}",
                workers, signalled
            )));
        }
        if rows_received != height {
            return Err(RenderError::Worker(format!(
                "expected {} rows, received {}",
                height, rows_received
            )));
        }
        Ok(buffer)
    }
}
