extern crate pinwheel_macros;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pinwheel::errors::Error;
use pinwheel::utils::task;
use serial_test::serial;

#[pinwheel_macros::runtime]
async fn example_runtime_function() -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    for ms in [30, 10, 20] {
        let counter = counter.clone();
        task::run(async move {
            pinwheel::pause!(ms);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    counter
}

#[pinwheel_macros::runtime]
async fn example_nested_tasks() -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    let outer = counter.clone();
    task::run(async move {
        let inner = outer.clone();
        task::run(async move {
            pinwheel::pause!(20);
            inner.fetch_add(1, Ordering::SeqCst);
        })?;
        outer.fetch_add(1, Ordering::SeqCst);
        Ok::<(), Error>(())
    })
    .unwrap();
    counter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[pinwheel_macros::test]
    #[serial]
    async fn example_test_function() {
        task::run(async move {
            pinwheel::pause!(10);
        })
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_runtime_macro_waits_for_tasks() {
        let counter = example_runtime_function();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    #[serial]
    fn test_runtime_macro_waits_for_nested_tasks() {
        let counter = example_nested_tasks();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[serial]
    fn test_task_outside_runtime() {
        assert!(task::run(async move {}).is_err());
    }
}
