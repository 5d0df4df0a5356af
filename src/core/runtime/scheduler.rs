// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Time-ordered task scheduler.
//!
//! One loop task owns dispatch. It sleeps until the earliest deadline or until
//! notified, pops exactly one due task per wake, and hands its job to
//! `tokio::spawn` without awaiting it. Recurring tasks are reinserted at
//! `start + period` under the same lock that removed them, before the job runs.

use crate::core::error::ErrorKind;
use crate::monitoring::metrics::Metrics;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// A schedulable unit of work. Called once per firing.
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure as a [`Job`].
pub fn job<F, Fut>(f: F) -> Job
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Scheduler errors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler has been shut down.
    #[error("scheduler shut down")]
    ShutDown,
    /// Recurring task with a zero period.
    #[error("zero period")]
    ZeroPeriod,
}

impl SchedulerError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulerError::ShutDown => ErrorKind::StateError,
            SchedulerError::ZeroPeriod => ErrorKind::DomainError,
        }
    }
}

/// Identity of a scheduled task, used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

enum Task {
    OneShot(Job, Instant),
    Recurring(Job, Instant, Duration),
}

#[derive(Default)]
struct Queue {
    by_time: BTreeMap<(Instant, TaskHandle), Task>,
    by_handle: BTreeMap<TaskHandle, Instant>,
}

impl Queue {
    fn insert(&mut self, handle: TaskHandle, task: Task) {
        let start = match &task {
            Task::OneShot(_, start) | Task::Recurring(_, start, _) => *start,
        };
        self.by_time.insert((start, handle), task);
        self.by_handle.insert(handle, start);
    }

    fn remove(&mut self, handle: TaskHandle) -> bool {
        match self.by_handle.remove(&handle) {
            Some(start) => self.by_time.remove(&(start, handle)).is_some(),
            None => false,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.by_time.keys().next().map(|(start, _)| *start)
    }

    fn pop_due(&mut self, now: Instant) -> Option<(TaskHandle, Job)> {
        let (start, handle) = *self.by_time.keys().next()?;
        if start > now {
            return None;
        }
        let task = self.by_time.remove(&(start, handle))?;
        self.by_handle.remove(&handle);
        match task {
            Task::OneShot(job, _) => Some((handle, job)),
            Task::Recurring(job, start, period) => {
                self.insert(handle, Task::Recurring(job.clone(), start + period, period));
                Some((handle, job))
            }
        }
    }

    fn clear(&mut self) {
        self.by_time.clear();
        self.by_handle.clear();
    }
}

struct Inner {
    queue: Mutex<Queue>,
    notify: Notify,
    next_handle: AtomicU64,
    started: AtomicBool,
    shut_down: AtomicBool,
    metrics: Option<Arc<Metrics>>,
}

/// Time-ordered task scheduler. Dropping it shuts it down.
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// New, not yet started scheduler.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// New scheduler counting dispatched tasks in `metrics`.
    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        Self::build(Some(metrics))
    }

    fn build(metrics: Option<Arc<Metrics>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(Queue::default()),
                notify: Notify::new(),
                next_handle: AtomicU64::new(1),
                started: AtomicBool::new(false),
                shut_down: AtomicBool::new(false),
                metrics,
            }),
        }
    }

    /// Spawn the dispatch loop on the current tokio runtime. Idempotent.
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.inner.shut_down.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        tokio::spawn(run(self.inner.clone()));
        Ok(())
    }

    /// Run `job` as soon as possible.
    pub fn schedule_now(&self, job: Job) -> Result<TaskHandle, SchedulerError> {
        self.schedule_at(job, Instant::now())
    }

    /// Run `job` once at `at`.
    pub fn schedule_at(&self, job: Job, at: Instant) -> Result<TaskHandle, SchedulerError> {
        self.push(Task::OneShot(job, at))
    }

    /// Run `job` at `first` and then every `period`.
    pub fn schedule_every(
        &self,
        job: Job,
        first: Instant,
        period: Duration,
    ) -> Result<TaskHandle, SchedulerError> {
        if period.is_zero() {
            return Err(SchedulerError::ZeroPeriod);
        }
        self.push(Task::Recurring(job, first, period))
    }

    fn push(&self, task: Task) -> Result<TaskHandle, SchedulerError> {
        if self.inner.shut_down.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }
        let handle = TaskHandle(self.inner.next_handle.fetch_add(1, Ordering::Relaxed));
        self.inner.queue.lock().insert(handle, task);
        self.inner.notify.notify_one();
        Ok(handle)
    }

    /// Cancel a task that has not fired yet (or a recurring task). Returns
    /// false if it was unknown or already gone.
    pub fn remove(&self, handle: TaskHandle) -> bool {
        let removed = self.inner.queue.lock().remove(handle);
        if removed {
            self.inner.notify.notify_one();
        }
        removed
    }

    /// Drop every pending task; the loop keeps running.
    pub fn clear(&self) {
        self.inner.queue.lock().clear();
        self.inner.notify.notify_one();
    }

    /// Drop every pending task and stop the loop. Idempotent.
    pub fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.queue.lock().clear();
        self.inner.notify.notify_one();
        debug!("scheduler shut down");
    }

    /// Pending task count.
    pub fn len(&self) -> usize {
        self.inner.queue.lock().by_time.len()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run(inner: Arc<Inner>) {
    debug!("scheduler loop started");
    while !inner.shut_down.load(Ordering::Acquire) {
        let now = Instant::now();
        let (due, next) = {
            let mut queue = inner.queue.lock();
            let due = queue.pop_due(now);
            (due, queue.next_deadline())
        };

        if let Some((handle, job)) = due {
            debug!(task = handle.0, "dispatching task");
            if let Some(m) = &inner.metrics {
                m.scheduler_tasks_fired_total.inc();
            }
            tokio::spawn(job());
            continue;
        }

        match next {
            None => inner.notify.notified().await,
            Some(at) => {
                tokio::select! {
                    _ = inner.notify.notified() => {}
                    _ = sleep_until(at) => {}
                }
            }
        }
    }
    debug!("scheduler loop stopped");
}
