//! Shared processing loop with progress reporting and cooperative
//! cancellation.
//!
//! The loop walks columns on the outside and rows on the inside. Progress is
//! reported and cancellation polled once per column, so the worst-case
//! cancellation latency is one column of `map_pixel` calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::filters::PixelFilter;
use crate::image::PixelBuffer;

/// Receives progress from the driver and answers cancellation queries.
pub trait ProgressSink {
    /// Progress in percent, 0-100, non-decreasing within one run.
    fn report(&mut self, percent: u8);

    fn is_cancelled(&self) -> bool;
}

/// Sink that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Sink built from a progress callback and a cancellation query.
pub struct CallbackSink<P, C> {
    on_progress: P,
    is_cancelled: C,
}

impl<P, C> CallbackSink<P, C>
where
    P: FnMut(u8),
    C: Fn() -> bool,
{
    pub fn new(on_progress: P, is_cancelled: C) -> Self {
        CallbackSink {
            on_progress,
            is_cancelled,
        }
    }
}

impl<P, C> ProgressSink for CallbackSink<P, C>
where
    P: FnMut(u8),
    C: Fn() -> bool,
{
    fn report(&mut self, percent: u8) {
        (self.on_progress)(percent)
    }

    fn is_cancelled(&self) -> bool {
        (self.is_cancelled)()
    }
}

/// Shared cancellation flag.
///
/// Clones observe the same flag, so one clone can be handed to the running
/// job while another stays with the caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl ProgressSink for CancellationToken {
    fn report(&mut self, _percent: u8) {}

    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

/// Result of one processing call.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The filtered image.
    Finished(PixelBuffer),
    /// Cancellation was observed; the partial result was discarded.
    Cancelled,
}

impl FilterOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FilterOutcome::Cancelled)
    }

    pub fn into_image(self) -> Option<PixelBuffer> {
        match self {
            FilterOutcome::Finished(image) => Some(image),
            FilterOutcome::Cancelled => None,
        }
    }
}

/// `floor(column / width * 100)` in exact integer arithmetic.
#[inline]
fn column_percent(column: usize, width: usize) -> u8 {
    (column * 100 / width) as u8
}

/// Run `filter` over `source`.
///
/// `prepare` runs once up front and is not interruptible. Each column starts
/// with a progress report followed by a cancellation check. A completed run
/// ends with a report of 100.
pub fn process<F, S>(source: &PixelBuffer, filter: &F, sink: &mut S) -> FilterOutcome
where
    F: PixelFilter,
    S: ProgressSink + ?Sized,
{
    let (width, height) = (source.width(), source.height());
    debug!("{}: processing {}x{} image", filter.name(), width, height);

    let mut stats = filter.prepare(source);
    let mut result = source.blank_like();

    for x in 0..width {
        sink.report(column_percent(x, width));
        if sink.is_cancelled() {
            debug!("{}: cancelled at column {}/{}", filter.name(), x, width);
            return FilterOutcome::Cancelled;
        }
        for y in 0..height {
            let pixel = filter.map_pixel(source, x, y, &mut stats);
            result.set_pixel(x, y, pixel);
        }
    }

    sink.report(100);
    debug!("{}: finished", filter.name());
    FilterOutcome::Finished(result)
}

/// Callback form of [`process`].
pub fn process_with<F, P, C>(
    source: &PixelBuffer,
    filter: &F,
    on_progress: P,
    is_cancelled: C,
) -> FilterOutcome
where
    F: PixelFilter,
    P: FnMut(u8),
    C: Fn() -> bool,
{
    let mut sink = CallbackSink::new(on_progress, is_cancelled);
    process(source, filter, &mut sink)
}
