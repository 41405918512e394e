//! Single-consumer task queue standing in for the UI event thread.
//!
//! Work posted through a [`UiExecutor`] runs on exactly one thread, in the
//! order it was posted from any given producer thread. The consumer side is
//! either a [`UiQueue`] drained by the frame loop, or a dedicated thread from
//! [`UiExecutor::spawn_dedicated`].

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crate::error::{Result, SeriesError};

type Task = Box<dyn FnOnce() + Send + 'static>;
type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct UiExecutor {
    sender: Sender<Task>,
    ui_thread: ThreadId,
    waker: Option<Waker>,
}

pub struct UiQueue {
    receiver: Receiver<Task>,
    ui_thread: ThreadId,
}

impl UiExecutor {
    /// Creates an executor bound to the calling thread. The caller must drain
    /// the returned queue from this same thread.
    pub fn channel() -> (UiExecutor, UiQueue) {
        let (sender, receiver) = mpsc::channel::<Task>();
        let ui_thread = thread::current().id();
        (
            UiExecutor {
                sender,
                ui_thread,
                waker: None,
            },
            UiQueue {
                receiver,
                ui_thread,
            },
        )
    }

    /// Starts a dedicated UI thread that runs posted tasks until every
    /// executor handle has been dropped.
    pub fn spawn_dedicated(name: &str) -> std::io::Result<(UiExecutor, JoinHandle<()>)> {
        let (sender, receiver) = mpsc::channel::<Task>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for task in receiver {
                    task();
                }
                log::debug!("UI executor thread exiting");
            })?;
        let ui_thread = handle.thread().id();
        Ok((
            UiExecutor {
                sender,
                ui_thread,
                waker: None,
            },
            handle,
        ))
    }

    /// Calls `waker` after every post, so an idle frame loop knows to drain.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Wakes the egui frame loop after every post.
    pub fn with_repaint(self, ctx: egui::Context) -> Self {
        self.with_waker(move || ctx.request_repaint())
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> Result<()> {
        self.sender
            .send(Box::new(task))
            .map_err(|_| SeriesError::ExecutorClosed)?;
        if let Some(waker) = &self.waker {
            waker();
        }
        Ok(())
    }

    /// Runs `task` immediately when called on the UI thread, posts it otherwise.
    pub fn run_or_post(&self, task: impl FnOnce() + Send + 'static) -> Result<()> {
        if self.is_ui_thread() {
            task();
            Ok(())
        } else {
            self.post(task)
        }
    }

    /// Blocks until every task posted before this call has run.
    /// Returns immediately on the UI thread itself.
    pub fn flush(&self) -> Result<()> {
        if self.is_ui_thread() {
            return Ok(());
        }
        let (done_tx, done_rx) = mpsc::channel::<()>();
        self.post(move || {
            let _ = done_tx.send(());
        })?;
        done_rx.recv().map_err(|_| SeriesError::ExecutorClosed)
    }
}

impl fmt::Debug for UiExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiExecutor")
            .field("ui_thread", &self.ui_thread)
            .field("has_waker", &self.waker.is_some())
            .finish()
    }
}

impl UiQueue {
    /// Runs every task currently queued and returns how many ran.
    pub fn drain(&self) -> usize {
        if thread::current().id() != self.ui_thread {
            log::warn!("UiQueue drained from a thread other than the one it is bound to");
        }
        let mut ran = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if ran > 0 {
            log::trace!("UI queue ran {ran} task(s)");
        }
        ran
    }
}

impl fmt::Debug for UiQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiQueue")
            .field("ui_thread", &self.ui_thread)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn run_or_post_runs_inline_on_bound_thread() {
        let (executor, queue) = UiExecutor::channel();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        executor
            .run_or_post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .expect("run_or_post should succeed");

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn posts_from_worker_wait_for_drain() {
        let (executor, queue) = UiExecutor::channel();
        let hits = Arc::new(AtomicUsize::new(0));

        let worker_executor = executor.clone();
        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            assert!(!worker_executor.is_ui_thread());
            worker_executor
                .run_or_post(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .expect("post should succeed");
        })
        .join()
        .expect("worker should not panic");

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(queue.drain(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dedicated_thread_preserves_post_order() {
        let (executor, handle) =
            UiExecutor::spawn_dedicated("ui-order-test").expect("UI thread should spawn");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for value in 0..50 {
            let seen = Arc::clone(&seen);
            executor
                .post(move || seen.lock().expect("lock").push(value))
                .expect("post should succeed");
        }
        executor.flush().expect("flush should succeed");
        drop(executor);
        handle.join().expect("UI thread should exit cleanly");

        let seen = seen.lock().expect("lock");
        assert_eq!(*seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn waker_runs_after_each_post() {
        let (executor, queue) = UiExecutor::channel();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let executor = executor.with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        executor.post(|| {}).expect("post should succeed");
        executor.post(|| {}).expect("post should succeed");
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert_eq!(queue.drain(), 2);
    }

    #[test]
    fn post_fails_once_queue_is_gone() {
        let (executor, queue) = UiExecutor::channel();
        drop(queue);
        assert_eq!(executor.post(|| {}), Err(SeriesError::ExecutorClosed));
    }
}
