//! Defines Pinwheel Runtime task runner.
use std::future::Future;

use log::{debug, error};
use parking_lot::{const_mutex, Mutex};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task;
use tokio::task::JoinHandle;

use crate::errors::{Error, RuntimeError, Unknown};

/// Represents the result of a task.
/// A task may return either () or Result<(), Error> for flexibility which
/// will be converted to TaskResult sent to the runtime.
pub enum TaskResult {
    Ok,
    Err(Error),
}

/// Represents a handler for a task.
pub type TaskHandler = JoinHandle<Result<(), Error>>;

type TaskReceiver = UnboundedReceiver<TaskResult>;

/// Globally accessible runtime transmitter(TX)/receiver(RX): each spawned task sends its own
/// result receiver through it so the runtime can wait for it.
static RUNTIME_TX: Mutex<Option<UnboundedSender<TaskReceiver>>> = const_mutex(None);
static RUNTIME_RX: Mutex<Option<UnboundedReceiver<TaskReceiver>>> = const_mutex(None);

impl From<Result<(), Error>> for TaskResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(_) => TaskResult::Ok,
            Err(e) => TaskResult::Err(e),
        }
    }
}

impl From<()> for TaskResult {
    fn from(_: ()) -> Self {
        TaskResult::Ok
    }
}

/// Creates a fresh runtime channel. Called first thing by `#[pinwheel::runtime]`.
pub fn init_task_channel() {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<TaskReceiver>();
    *RUNTIME_TX.lock() = Some(tx);
    *RUNTIME_RX.lock() = Some(rx);
}

/// Waits for every task registered through [`run()`] (including tasks spawned by tasks) to
/// report its result. Called last thing by `#[pinwheel::runtime]`.
pub async fn wait_for_tasks() {
    let receiver = RUNTIME_RX.lock().take();
    let Some(mut receiver) = receiver else {
        RUNTIME_TX.lock().take();
        return;
    };

    // A task registers its children before it reports: draining until empty catches them all.
    while let Ok(mut task_receiver) = receiver.try_recv() {
        match task_receiver.recv().await {
            Some(TaskResult::Err(err)) => error!("Task failed: {}", err),
            Some(TaskResult::Ok) => {}
            None => debug!("Task ended without reporting (aborted)"),
        }
    }
    RUNTIME_TX.lock().take();
}

/// Runs a given future as a Tokio task while ensuring the main function (marked by `#[pinwheel::runtime]`)
/// will not finish before all tasks running are done.
/// This is done by using a globally accessible channel to communicate the handlers to be waited by the
/// runtime.
///
/// # Parameters
/// * `future`: A future that implements `Future<Output = ()>`, `Send`, and has a `'static` lifetime.
///
/// # Errors
/// Returns a `RuntimeError` if the runtime channel is not initialized (outside `#[pinwheel::runtime]`).
///
/// # Example
/// ```ignore
/// #[pinwheel::runtime]
/// async fn main() {
///     task::run(async move {
///         // whatever
///     }).unwrap();
/// }
/// ```
pub fn run<F, T>(future: F) -> Result<TaskHandler, Error>
where
    F: Future<Output = T> + Send + 'static,
    T: Into<TaskResult> + Send + 'static,
{
    // Create a transmitter(tx)/receiver(rx) unique to this task.
    let (task_tx, task_rx) = tokio::sync::mpsc::unbounded_channel();

    // --
    // Send the receiver(rx) side of the task-channel to the runtime.
    {
        let lock = RUNTIME_TX.lock();
        let runtime_tx = lock.as_ref().ok_or(RuntimeError)?;
        runtime_tx.send(task_rx).map_err(|err| Unknown {
            info: err.to_string(),
        })?;
    }

    // --
    // Create a task to run our future: note how we capture the tx...
    let handler = task::spawn(async move {
        // ...to send the result of the future through that channel.
        let result = future.await.into();
        task_tx.send(result).map_err(|err| Unknown {
            info: err.to_string(),
        })?;
        Ok(())
    });

    Ok(handler)
}

#[macro_export]
macro_rules! pause {
    ($ms:expr) => {
        $crate::utils::tokio::time::sleep(std::time::Duration::from_millis($ms as u64)).await
    };
}

#[macro_export]
macro_rules! pause_sync {
    ($ms:expr) => {
        std::thread::sleep(std::time::Duration::from_millis($ms as u64))
    };
}
