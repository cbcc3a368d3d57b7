use crate::{FetchFault, LoadTask, ProgressEvent};
use futures::future::BoxFuture;
use scene_kiln::{RawLoadResult, Scene};
use std::path::Path;
use std::sync::{Arc, Weak};
use std::task::Poll;

pub struct FetchRequest
{
    pub root_url: String,
    pub file_name: String,
    pub plugin_extension: Option<String>, // overrides the file extension when picking a loader
    pub scene: Arc<Scene>,
    pub progress: ProgressReporter,
}
impl FetchRequest
{
    // The extension used to pick a loader, without the leading '.'
    #[must_use]
    pub fn extension(&self) -> Option<&str>
    {
        match &self.plugin_extension
        {
            Some(ext) => Some(ext.trim_start_matches('.')),
            None => Path::new(&self.file_name).extension().and_then(|e| e.to_str()),
        }
    }
}

// Lets a fetch report progress back to the task that started it
#[derive(Clone, Default)]
pub struct ProgressReporter
{
    task: Weak<LoadTask>,
}
impl ProgressReporter
{
    pub(crate) fn new(task: Weak<LoadTask>) -> Self
    {
        Self { task }
    }

    // Not connected to any task, reports go nowhere
    #[must_use]
    pub fn detached() -> Self { Self::default() }

    pub fn report(&self, event: ProgressEvent)
    {
        if let Some(task) = self.task.upgrade()
        {
            task.notify_progress(event);
        }
    }
}

/// Wakes itself and returns pending once, so other tasks on the same executor get a turn.
/// Fetchers that do blocking work in steps should await this between steps.
pub async fn yield_now()
{
    let mut yielded = false;
    futures::future::poll_fn(|cx|
    {
        if yielded
        {
            return Poll::Ready(());
        }
        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }).await
}

/// Produces raw load results for a location + name.
///
/// The returned future is spawned onto the loader's executor and must not capture
/// borrowed state.
pub trait ResourceFetcher: Send + Sync
{
    fn name(&self) -> &str;

    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, Result<RawLoadResult, FetchFault>>;
}
