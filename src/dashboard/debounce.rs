//! Cancellable delayed execution.
//!
//! Scheduling a job replaces any job still waiting out its delay. Once the
//! delay has elapsed the job runs in its own task, so later cancellation
//! only detaches it; in-flight work is never interrupted.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// What [`Debouncer::flush`] found
#[derive(Debug)]
pub enum Flush {
    /// Nothing scheduled
    Idle,
    /// A job was still waiting and has been cancelled; the caller should run
    /// it now
    Cancelled,
    /// The job already started; await the handle for it to finish
    Running(JoinHandle<()>),
}

#[derive(Debug)]
struct Pending {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// Trailing-edge debouncer on the tokio runtime
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

impl Debouncer {
    /// Debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    /// Quiet period
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `job` once `delay` has passed without another call to
    /// `schedule`. Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
            // Dropping this handle on abort detaches the job.
            let _ = tokio::spawn(job).await;
        });

        self.pending = Some(Pending { handle, fired });
    }

    /// Cancel a job that has not started yet. Returns whether one was
    /// waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.handle.abort();
                !pending.fired.load(Ordering::SeqCst)
            }
            None => false,
        }
    }

    /// Whether a job is scheduled or still running
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |pending| !pending.handle.is_finished())
    }

    /// Take the scheduled job out of the debouncer.
    pub fn flush(&mut self) -> Flush {
        match self.pending.take() {
            None => Flush::Idle,
            Some(pending) if pending.fired.load(Ordering::SeqCst) => Flush::Running(pending.handle),
            Some(pending) => {
                pending.handle.abort();
                Flush::Cancelled
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_job(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_run_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(counting_job(&counter));
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.schedule(counting_job(&counter));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(counting_job(&counter));
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_states() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        assert!(matches!(debouncer.flush(), Flush::Idle));

        debouncer.schedule(counting_job(&counter));
        assert!(matches!(debouncer.flush(), Flush::Cancelled));

        debouncer.schedule(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        tokio::time::sleep(Duration::from_millis(600)).await;
        match debouncer.flush() {
            Flush::Running(handle) => handle.await.unwrap(),
            other => panic!("expected running job, got {:?}", other),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
