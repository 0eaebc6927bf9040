//! Background jobs of the widget process.
//!
//! A job runs on its own thread and never touches the layout tree. It
//! publishes results through shared application state (see
//! [`crate::bound::Bound`]) and observes its `stop` flag cooperatively.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Errors kept in [`Jobs::errors`]; older entries are dropped.
pub const ERROR_LOG_LEN: usize = 64;

/// Shared state of one job, visible to the UI and to the job itself.
#[derive(Debug)]
pub struct Job {
    pub uid: String,
    pub title: String,
    stop: AtomicBool,
    progress: AtomicU32,
    done: AtomicBool,
    errors: Mutex<Vec<String>>,
}

impl Job {
    fn new(uid: &str, title: &str) -> Self {
        Self {
            uid: uid.to_string(),
            title: title.to_string(),
            stop: AtomicBool::new(false),
            progress: AtomicU32::new(0f32.to_bits()),
            done: AtomicBool::new(false),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Progress in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        f32::from_bits(self.progress.load(Ordering::Relaxed))
    }

    pub fn set_progress(&self, value: f32) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        self.progress.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn add_error(&self, message: impl Into<String>) {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).push(message.into());
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// Tail of every `REFRESH` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobsReport {
    pub running: u32,
    /// A job finished since the last report; the host refreshes once more.
    pub need_refresh: bool,
}

struct Running {
    job: Arc<Job>,
    thread: Option<JoinHandle<()>>,
}

/// Registry of running jobs.
#[derive(Default)]
pub struct Jobs {
    running: Vec<Running>,
    need_refresh: bool,
    /// Errors of finished jobs, newest last, at most [`ERROR_LOG_LEN`].
    log: Vec<String>,
}

impl Jobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `f` on a new thread unless a job with the same `uid` is still
    /// running. Returns false when it was not started.
    pub fn start_job<F>(&mut self, uid: &str, title: &str, f: F) -> bool
    where
        F: FnOnce(&Job) + Send + 'static,
    {
        if self.find(uid).is_some() {
            return false;
        }
        let job = Arc::new(Job::new(uid, title));
        let worker = Arc::clone(&job);
        let spawned = thread::Builder::new().name(format!("job-{uid}")).spawn(move || {
            f(&worker);
            worker.set_progress(1.0);
            worker.done.store(true, Ordering::Release);
        });
        match spawned {
            Ok(thread) => {
                debug!(uid, title, "job started");
                self.running.push(Running {
                    job,
                    thread: Some(thread),
                });
                true
            }
            Err(err) => {
                warn!(uid, %err, "failed to spawn job thread");
                self.push_error(format!("{title}: {err}"));
                false
            }
        }
    }

    pub fn find(&self, uid: &str) -> Option<&Arc<Job>> {
        self.running.iter().map(|r| &r.job).find(|j| j.uid == uid)
    }

    pub fn is_running(&self, uid: &str) -> bool {
        self.find(uid).is_some()
    }

    /// Asks the job to stop. It leaves the registry once its thread returns.
    pub fn stop(&self, uid: &str) -> bool {
        match self.find(uid) {
            Some(job) => {
                job.stop();
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&self) {
        for r in &self.running {
            r.job.stop();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Job>> {
        self.running.iter().map(|r| &r.job)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Reaps finished jobs and collects their errors.
    pub fn maintenance(&mut self) {
        let mut i = 0;
        while i < self.running.len() {
            let finished = self.running[i].thread.as_ref().map(|t| t.is_finished()).unwrap_or(true);
            if !finished {
                i += 1;
                continue;
            }
            let mut done = self.running.swap_remove(i);
            if let Some(thread) = done.thread.take() {
                if thread.join().is_err() {
                    done.job.add_error("job panicked");
                }
            }
            for err in done.job.errors() {
                warn!(uid = %done.job.uid, "job error: {err}");
                self.push_error(format!("{}: {err}", done.job.title));
            }
            debug!(uid = %done.job.uid, "job finished");
            self.need_refresh = true;
        }
    }

    /// Reaps finished jobs and reports, clearing the refresh request.
    pub fn report(&mut self) -> JobsReport {
        self.maintenance();
        JobsReport {
            running: self.running.len() as u32,
            need_refresh: std::mem::take(&mut self.need_refresh),
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.log
    }

    fn push_error(&mut self, entry: String) {
        self.log.push(entry);
        if self.log.len() > ERROR_LOG_LEN {
            let excess = self.log.len() - ERROR_LOG_LEN;
            self.log.drain(..excess);
        }
    }

    /// Stops every job and waits for the threads.
    pub fn shutdown(&mut self) {
        self.stop_all();
        for mut r in self.running.drain(..) {
            if let Some(thread) = r.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for Jobs {
    fn drop(&mut self) {
        self.stop_all();
    }
}
