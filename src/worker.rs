//! Background execution of one filter job at a time.
//!
//! A job runs on its own `std::thread` and reports back over a
//! `crossbeam_channel`: zero or more [`WorkerEvent::Progress`] messages, then
//! exactly one of [`WorkerEvent::Finished`] or [`WorkerEvent::Cancelled`].
//! The source image is shared read-only through an `Arc`; the destination
//! belongs to the job thread until it is sent.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::filters::Filter;
use crate::image::PixelBuffer;
use crate::process::{CancellationToken, FilterOutcome, ProgressSink};

/// Message from a running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Progress(u8),
    Finished(PixelBuffer),
    Cancelled,
}

/// Forwards progress over the channel and polls the job's token.
struct ChannelSink {
    tx: Sender<WorkerEvent>,
    token: CancellationToken,
}

impl ProgressSink for ChannelSink {
    fn report(&mut self, percent: u8) {
        // Receiver may be gone; progress is advisory
        let _ = self.tx.send(WorkerEvent::Progress(percent));
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct Job {
    handle: JoinHandle<()>,
    token: CancellationToken,
}

/// Runs at most one filter job in the background.
#[derive(Default)]
pub struct FilterWorker {
    job: Option<Job>,
}

impl FilterWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a submitted job has not yet returned.
    pub fn is_busy(&self) -> bool {
        self.job.as_ref().is_some_and(|job| !job.handle.is_finished())
    }

    /// Start `filter` on `source`.
    ///
    /// Fails with [`Error::WorkerBusy`] if the previous job is still running.
    pub fn submit(
        &mut self,
        source: Arc<PixelBuffer>,
        filter: Filter,
    ) -> Result<Receiver<WorkerEvent>> {
        if self.is_busy() {
            return Err(Error::WorkerBusy);
        }
        if let Some(previous) = self.job.take() {
            if previous.handle.join().is_err() {
                warn!("previous filter job panicked");
            }
        }

        let (tx, rx) = unbounded();
        let token = CancellationToken::new();
        let mut sink = ChannelSink {
            tx: tx.clone(),
            token: token.clone(),
        };

        debug!("submitting {} job", filter.name());
        let handle = thread::spawn(move || {
            let event = match filter.process(&source, &mut sink) {
                FilterOutcome::Finished(image) => WorkerEvent::Finished(image),
                FilterOutcome::Cancelled => WorkerEvent::Cancelled,
            };
            let _ = tx.send(event);
        });

        self.job = Some(Job { handle, token });
        Ok(rx)
    }

    /// Request cancellation of the running job, if any.
    ///
    /// Takes effect at the job's next column boundary.
    pub fn cancel(&self) {
        if let Some(job) = &self.job {
            job.token.cancel();
        }
    }

    /// Block until the current job returns.
    pub fn wait(&mut self) -> Result<()> {
        match self.job.take() {
            Some(job) => job.handle.join().map_err(|_| Error::WorkerPanicked),
            None => Ok(()),
        }
    }
}

/// Cancels the running job and waits for its thread to exit.
impl Drop for FilterWorker {
    fn drop(&mut self) {
        self.cancel();
        if let Some(job) = self.job.take() {
            if job.handle.join().is_err() {
                warn!("filter job panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ConvolutionFilter, Invert};
    use crate::image::Rgb;

    fn large_image() -> Arc<PixelBuffer> {
        Arc::new(
            PixelBuffer::from_fn(1500, 1500, |x, y| Rgb::new(x as u8, y as u8, (x ^ y) as u8))
                .unwrap(),
        )
    }

    #[test]
    fn test_job_reports_progress_then_result() {
        let source = Arc::new(PixelBuffer::filled(8, 3, Rgb::gray(10)).unwrap());
        let mut worker = FilterWorker::new();

        let rx = worker.submit(Arc::clone(&source), Invert.into()).unwrap();
        let events: Vec<WorkerEvent> = rx.iter().collect();
        worker.wait().unwrap();

        let (last, progress) = events.split_last().unwrap();
        let expected = PixelBuffer::filled(8, 3, Rgb::gray(245)).unwrap();
        assert_eq!(*last, WorkerEvent::Finished(expected));

        let percents: Vec<u8> = progress
            .iter()
            .map(|e| match e {
                WorkerEvent::Progress(p) => *p,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents.first(), Some(&0));
        assert_eq!(percents.last(), Some(&100));

        assert_eq!(*source, PixelBuffer::filled(8, 3, Rgb::gray(10)).unwrap());
    }

    #[test]
    fn test_second_submit_while_busy_is_rejected() {
        let image = large_image();
        let mut worker = FilterWorker::new();
        let _rx = worker
            .submit(Arc::clone(&image), ConvolutionFilter::gaussian().into())
            .unwrap();

        let err = worker.submit(image, Invert.into()).unwrap_err();
        assert!(matches!(err, Error::WorkerBusy));

        worker.cancel();
        worker.wait().unwrap();
    }

    #[test]
    fn test_cancel_ends_with_cancelled() {
        let mut worker = FilterWorker::new();
        let rx = worker
            .submit(large_image(), ConvolutionFilter::gaussian().into())
            .unwrap();
        worker.cancel();

        let last = rx.iter().last().unwrap();
        worker.wait().unwrap();

        assert_eq!(last, WorkerEvent::Cancelled);
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_drop_cancels_and_joins_job() {
        let mut worker = FilterWorker::new();
        let rx = worker
            .submit(large_image(), ConvolutionFilter::gaussian().into())
            .unwrap();

        drop(worker);

        // The job thread has exited, so the channel is already closed
        let events: Vec<WorkerEvent> = rx.try_iter().collect();
        assert_eq!(events.last(), Some(&WorkerEvent::Cancelled));
        assert!(matches!(
            rx.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_worker_accepts_new_job_after_finish() {
        let source = Arc::new(PixelBuffer::filled(4, 4, Rgb::BLACK).unwrap());
        let mut worker = FilterWorker::new();

        let first = worker.submit(Arc::clone(&source), Invert.into()).unwrap();
        assert!(matches!(first.iter().last(), Some(WorkerEvent::Finished(_))));
        // The job thread may not have exited right after its last send
        worker.wait().unwrap();

        let second = worker.submit(source, Invert.into()).unwrap();
        assert!(matches!(second.iter().last(), Some(WorkerEvent::Finished(_))));
        worker.wait().unwrap();
    }
}
