//! Runtime abstraction layer for async operations
//!
//! The sync engine never awaits anything itself. It hands fetch futures to an
//! [`AsyncSpawner`] and picks the results up later, so the same controller
//! works under Tokio, on plain threads, or stepped by hand in tests.

use crate::prelude::{Arc, Future, Pin};
use std::sync::atomic::{AtomicBool, Ordering};

/// A boxed task as accepted by [`AsyncSpawner::spawn_boxed`]
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Completion/cancellation flags shared by the non-Tokio handles
#[derive(Debug, Default)]
struct TaskFlags {
    finished: AtomicBool,
    cancelled: AtomicBool,
}

struct FlagHandle(Arc<TaskFlags>);

impl AsyncHandle for FlagHandle {
    fn is_finished(&self) -> bool {
        self.0.finished.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::runtime::Handle;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner.
        ///
        /// Called outside a Tokio runtime it falls back to a detached thread.
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
                match Handle::try_current() {
                    Ok(handle) => Box::new(TokioHandle(handle.spawn(future))),
                    Err(_) => {
                        log::warn!("no Tokio runtime on this thread, spawning on a std thread");
                        super::thread::ThreadSpawner.spawn_boxed(future)
                    }
                }
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    pub mod thread {
        use super::*;

        /// Runs each task to completion on its own detached thread.
        ///
        /// Cancelling only prevents a task that has not started yet from running.
        pub struct ThreadSpawner;

        impl AsyncSpawner for ThreadSpawner {
            fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
                let flags = Arc::new(TaskFlags::default());
                let worker_flags = flags.clone();

                std::thread::spawn(move || {
                    if !worker_flags.cancelled.load(Ordering::SeqCst) {
                        futures::executor::block_on(future);
                    }
                    worker_flags.finished.store(true, Ordering::SeqCst);
                });

                Box::new(FlagHandle(flags))
            }
        }
    }

    pub mod manual {
        use super::*;
        use crate::prelude::Mutex;
        use std::collections::VecDeque;

        struct QueuedTask {
            future: BoxedTask,
            flags: Arc<TaskFlags>,
        }

        /// Queues tasks and runs them only when stepped.
        ///
        /// Lets tests and headless tools decide exactly when each fetch
        /// completes relative to viewport changes. Clones share one queue.
        #[derive(Clone, Default)]
        pub struct ManualSpawner {
            queue: Arc<Mutex<VecDeque<QueuedTask>>>,
        }

        impl ManualSpawner {
            pub fn new() -> Self {
                Self::default()
            }

            /// Number of spawned tasks that have not been run yet
            pub fn pending(&self) -> usize {
                self.queue.lock().map(|q| q.len()).unwrap_or(0)
            }

            /// Runs the oldest queued task on the calling thread.
            /// Returns `false` when the queue was empty.
            pub fn run_next(&self) -> bool {
                let next = match self.queue.lock() {
                    Ok(mut queue) => queue.pop_front(),
                    Err(_) => None,
                };
                let Some(task) = next else {
                    return false;
                };

                if !task.flags.cancelled.load(Ordering::SeqCst) {
                    futures::executor::block_on(task.future);
                }
                task.flags.finished.store(true, Ordering::SeqCst);
                true
            }

            /// Runs queued tasks until none are left, including any spawned
            /// while running. Returns how many ran.
            pub fn run_all(&self) -> usize {
                let mut ran = 0;
                while self.run_next() {
                    ran += 1;
                }
                ran
            }
        }

        impl AsyncSpawner for ManualSpawner {
            fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
                let flags = Arc::new(TaskFlags::default());
                if let Ok(mut queue) = self.queue.lock() {
                    queue.push_back(QueuedTask {
                        future,
                        flags: flags.clone(),
                    });
                }
                Box::new(FlagHandle(flags))
            }
        }
    }
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Arc<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Initialize the runtime with a specific spawner.
/// Returns `false` if a runtime was already in use.
pub fn init_runtime(spawner: Arc<dyn AsyncSpawner>) -> bool {
    RUNTIME.set(spawner).is_ok()
}

/// Get the global runtime spawner
pub fn runtime() -> Arc<dyn AsyncSpawner> {
    RUNTIME.get_or_init(default_spawner).clone()
}

#[cfg(feature = "tokio-runtime")]
fn default_spawner() -> Arc<dyn AsyncSpawner> {
    Arc::new(spawners::tokio_impl::TokioSpawner)
}

#[cfg(not(feature = "tokio-runtime"))]
fn default_spawner() -> Arc<dyn AsyncSpawner> {
    Arc::new(spawners::thread::ThreadSpawner)
}
