// ABOUTME: Marshals canvas work onto the canvas's single execution context.
// ABOUTME: Callers hand over a closure and await its result through a oneshot.

use std::panic::AssertUnwindSafe;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::Canvas;
use crate::error::CanvasError;

type Job = Box<dyn FnOnce(&mut dyn Canvas) + Send>;

/// Handle to a canvas owned by a dedicated thread.
///
/// Jobs run one at a time in submission order, so mutations from concurrent
/// tool invocations never interleave. Cloning the handle shares the same
/// canvas.
#[derive(Clone)]
pub struct CanvasHandle {
    jobs: mpsc::UnboundedSender<Job>,
}

impl CanvasHandle {
    /// Move `canvas` onto a new thread and return a handle to it.
    ///
    /// The thread exits once every handle is dropped.
    pub fn spawn<C: Canvas + 'static>(canvas: C) -> Result<Self, CanvasError> {
        let (jobs, mut rx) = mpsc::unbounded_channel::<Job>();

        std::thread::Builder::new()
            .name("canvas-ui".to_string())
            .spawn(move || {
                let mut canvas = canvas;
                while let Some(job) = rx.blocking_recv() {
                    // A panicking job drops its reply sender; the caller sees JobFailed.
                    if std::panic::catch_unwind(AssertUnwindSafe(|| job(&mut canvas))).is_err() {
                        warn!("Canvas job panicked");
                    }
                }
                debug!("Canvas execution context stopped");
            })?;

        Ok(Self { jobs })
    }

    /// Run `f` on the canvas thread and wait for its result.
    pub async fn run<R, F>(&self, f: F) -> Result<R, CanvasError>
    where
        F: FnOnce(&mut dyn Canvas) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move |canvas| {
            let _ = tx.send(f(canvas));
        });

        self.jobs.send(job).map_err(|_| CanvasError::Unavailable)?;
        rx.await.map_err(|_| CanvasError::JobFailed)
    }

    /// Run a read-only query on the canvas thread.
    pub async fn query<R, F>(&self, f: F) -> Result<R, CanvasError>
    where
        F: FnOnce(&dyn Canvas) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.run(move |canvas| f(&*canvas)).await
    }

    /// Run `f` as one undoable mutation: a single undo record named `label`
    /// is opened first and the canvas is redrawn afterwards.
    pub async fn mutate<R, F>(&self, label: &str, f: F) -> Result<R, CanvasError>
    where
        F: FnOnce(&mut dyn Canvas) -> R + Send + 'static,
        R: Send + 'static,
    {
        let label = label.to_string();
        self.run(move |canvas| {
            canvas.record_undo(&label);
            let result = f(canvas);
            canvas.redraw();
            result
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::canvas::{Guid, MemoryCanvas, Point};

    fn spawn_canvas() -> (CanvasHandle, Guid, crate::canvas::CanvasJournal) {
        let mut canvas = MemoryCanvas::new();
        let guid = canvas.add_component("Addition", Point::new(0.0, 0.0)).unwrap();
        let journal = canvas.journal();
        (CanvasHandle::spawn(canvas).unwrap(), guid, journal)
    }

    #[tokio::test]
    async fn test_run_returns_result() {
        let (handle, guid, _) = spawn_canvas();
        let name = handle
            .query(move |c| c.find(guid).map(|o| o.name.clone()))
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("Addition"));
    }

    #[tokio::test]
    async fn test_runs_on_dedicated_thread() {
        let (handle, _, _) = spawn_canvas();
        let thread_name = handle
            .run(|_| std::thread::current().name().map(str::to_string))
            .await
            .unwrap();
        assert_eq!(thread_name.as_deref(), Some("canvas-ui"));
    }

    #[test]
    fn test_callable_without_a_runtime() {
        let (handle, guid, _) = spawn_canvas();
        let moved = tokio_test::block_on(handle.run(move |c| c.move_to(guid, Point::new(5.0, 5.0))));
        assert!(matches!(moved, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_kill_context() {
        let (handle, guid, _) = spawn_canvas();

        let result: Result<(), _> = handle.run(|_| panic!("boom")).await;
        assert!(matches!(result, Err(CanvasError::JobFailed)));

        let still_there = handle.query(move |c| c.find(guid).is_some()).await.unwrap();
        assert!(still_there);
    }

    #[tokio::test]
    async fn test_mutate_records_one_undo_and_redraw() {
        let (handle, guid, journal) = spawn_canvas();
        handle
            .mutate("Move twice", move |c| {
                c.move_to(guid, Point::new(1.0, 1.0)).unwrap();
                c.move_to(guid, Point::new(2.0, 2.0)).unwrap();
            })
            .await
            .unwrap();

        assert_eq!(journal.undo_labels(), vec!["Move twice".to_string()]);
        assert_eq!(journal.redraw_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_are_serialized() {
        let (handle, guid, _) = spawn_canvas();
        let handle = Arc::new(handle);

        let mut tasks = Vec::new();
        for i in 0..20 {
            let handle = Arc::clone(&handle);
            tasks.push(tokio::spawn(async move {
                handle
                    .run(move |c| {
                        let x = c.find(guid).map(|o| o.pivot.x).unwrap_or_default();
                        c.move_to(guid, Point::new(x + 1.0, i as f64)).unwrap();
                    })
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let x = handle
            .query(move |c| c.find(guid).map(|o| o.pivot.x))
            .await
            .unwrap();
        assert_eq!(x, Some(20.0));
    }
}
