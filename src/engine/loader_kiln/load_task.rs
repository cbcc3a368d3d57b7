use crate::{FetchFault, FetchRequest, LoadFault, OnModelLoaded, ProgressEvent, ProgressRelay, ProgressReporter, ResourceFetcher};
use futures::task::{Spawn, SpawnExt};
use futures::FutureExt;
use nab_kiln::utils::ShortTypeName;
use parking_lot::Mutex;
use scene_kiln::{Model, ModelTransformer, RawLoadResult, Scene, TransformFault, TransformOptions, TransformRequest};
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll, Waker};

// Identifies a model within a scene scope
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ModelKey(Arc<str>);
impl ModelKey
{
    #[must_use]
    pub fn new(root_url: &str, file_name: &str) -> Self
    {
        Self(format!("{root_url}/{file_name}").into())
    }

    #[inline] #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}
impl Display for ModelKey
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}
impl Debug for ModelKey
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { Debug::fmt(&*self.0, f) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState
{
    Pending, // created, fetch not started
    Loading,
    Loaded,
    Failed,
}
impl LoadState
{
    #[inline] #[must_use]
    pub fn is_terminal(self) -> bool
    {
        matches!(self, Self::Loaded | Self::Failed)
    }
}

#[derive(Debug, Clone)]
pub enum TaskPoll
{
    Pending,
    Loaded(Arc<Model>),
    Failed(LoadFault),
}
impl TaskPoll
{
    #[inline] #[must_use]
    pub fn is_ready(&self) -> bool { !matches!(self, Self::Pending) }
}

enum TaskSlot
{
    Pending,
    Loading,
    Loaded(Arc<Model>),
    Failed(LoadFault),
}
impl TaskSlot
{
    fn state(&self) -> LoadState
    {
        match self
        {
            Self::Pending => LoadState::Pending,
            Self::Loading => LoadState::Loading,
            Self::Loaded(_) => LoadState::Loaded,
            Self::Failed(_) => LoadState::Failed,
        }
    }
}

struct LoadTaskInner
{
    slot: TaskSlot,
    wakers: Vec<Waker>, // suspenders waiting on a terminal state
}

// Where a task loads from
pub struct LoadSource
{
    pub root_url: String,
    pub file_name: String,
    pub plugin_extension: Option<String>,
    pub scene: Arc<Scene>,
}

/// A single-shot asynchronous load of one model.
///
/// Moves `Pending -> Loading -> Loaded | Failed` exactly once. Once terminal, [`LoadTask::poll`]
/// keeps returning the same result.
pub struct LoadTask
{
    key: ModelKey,
    inner: Mutex<LoadTaskInner>,
    progress_listeners: Mutex<Vec<Weak<ProgressRelay>>>,
}
impl LoadTask
{
    #[must_use]
    pub fn new(key: ModelKey) -> Self
    {
        Self
        {
            key,
            inner: Mutex::new(LoadTaskInner
            {
                slot: TaskSlot::Pending,
                wakers: Vec::new(),
            }),
            progress_listeners: Mutex::new(Vec::new()),
        }
    }

    #[inline] #[must_use]
    pub fn key(&self) -> &ModelKey { &self.key }

    #[inline] #[must_use]
    pub fn state(&self) -> LoadState { self.inner.lock().slot.state() }

    /// Dispatch the fetch. Returns false (and does nothing) if the task was already started.
    ///
    /// The fetch runs on `spawner`; on success the transformer runs on the same task, then
    /// `on_model_loaded` fires before the model becomes visible to [`LoadTask::poll`].
    /// A panicking fetch or transformer fails the task; a panicking callback is logged and the
    /// model is still published.
    pub fn start<S: Spawn + ?Sized>(
        self: &Arc<Self>,
        spawner: &S,
        fetcher: &Arc<dyn ResourceFetcher>,
        transformer: &Arc<dyn ModelTransformer>,
        source: LoadSource,
        options: TransformOptions,
        on_model_loaded: Option<OnModelLoaded>) -> bool
    {
        {
            let mut inner = self.inner.lock();
            if !matches!(inner.slot, TaskSlot::Pending)
            {
                log::warn!("{:?} was already started ({:?})", self.key, inner.slot.state());
                return false;
            }
            inner.slot = TaskSlot::Loading;
        }

        log::debug!("{:?} fetching with {}", self.key, fetcher.name());

        let transform_request = TransformRequest
        {
            file_name: source.file_name.clone(),
            options,
        };
        let fetch = fetcher.fetch(FetchRequest
        {
            root_url: source.root_url,
            file_name: source.file_name,
            plugin_extension: source.plugin_extension,
            scene: source.scene,
            progress: ProgressReporter::new(Arc::downgrade(self)),
        });

        let task = self.clone();
        let transformer = transformer.clone();
        let spawned = spawner.spawn(async move
        {
            // a panicking fetch, transform, or callback must still leave the task terminal
            let fetched = match AssertUnwindSafe(fetch).catch_unwind().await
            {
                Ok(fetched) => fetched,
                Err(payload) =>
                {
                    log::error!("Fetch for {:?} panicked: {}", task.key, panic_message(&*payload));
                    Err(FetchFault::Failed(format!("the fetch panicked: {}", panic_message(&*payload))))
                },
            };
            let outcome = match fetched
            {
                Ok(raw) => Self::transform_isolated(&*transformer, raw, &transform_request),
                Err(fault) => Err(LoadFault::from(fault)),
            };
            task.complete(outcome, on_model_loaded);
        });

        if let Err(err) = spawned
        {
            log::error!("Failed to spawn fetch for {:?}: {err}", self.key);
            self.complete(Err(FetchFault::Shutdown.into()), None);
        }
        true
    }

    fn transform_isolated(transformer: &dyn ModelTransformer, raw: RawLoadResult, request: &TransformRequest) -> Result<Model, LoadFault>
    {
        match std::panic::catch_unwind(AssertUnwindSafe(|| transformer.transform(raw, request)))
        {
            Ok(transformed) => transformed.map_err(LoadFault::from),
            Err(payload) =>
            {
                let reason = format!("the transformer panicked: {}", panic_message(&*payload));
                Err(TransformFault::Rejected(reason).into())
            },
        }
    }

    fn complete(&self, outcome: Result<Model, LoadFault>, on_model_loaded: Option<OnModelLoaded>)
    {
        let slot = match outcome
        {
            Ok(model) =>
            {
                let model = Arc::new(model);
                if let Some(on_loaded) = on_model_loaded
                {
                    // the model is fine, publish it regardless
                    if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(|| on_loaded(&model)))
                    {
                        log::error!("on_model_loaded panicked for {:?}: {}", self.key, panic_message(&*payload));
                    }
                }
                TaskSlot::Loaded(model)
            },
            Err(fault) =>
            {
                log::warn!("Failed to load {:?}: {fault}", self.key);
                TaskSlot::Failed(fault)
            },
        };

        let wakers =
        {
            let mut inner = self.inner.lock();
            if !matches!(inner.slot, TaskSlot::Loading)
            {
                // single-shot, a second completion is dropped
                log::error!("{:?} completed while {:?}", self.key, inner.slot.state());
                return;
            }
            inner.slot = slot;
            std::mem::take(&mut inner.wakers)
        };

        for waker in wakers
        {
            waker.wake();
        }
    }

    /// Non-blocking read of the task's result.
    #[must_use]
    pub fn poll(&self) -> TaskPoll
    {
        match &self.inner.lock().slot
        {
            TaskSlot::Pending | TaskSlot::Loading => TaskPoll::Pending,
            TaskSlot::Loaded(model) => TaskPoll::Loaded(model.clone()),
            TaskSlot::Failed(fault) => TaskPoll::Failed(fault.clone()),
        }
    }

    // A future that settles once this task is terminal
    #[must_use]
    pub fn ready(self: &Arc<Self>) -> Suspender
    {
        Suspender { task: self.clone() }
    }

    pub fn add_progress_listener(&self, listener: Weak<ProgressRelay>)
    {
        self.progress_listeners.lock().push(listener);
    }

    /// Fan a progress event out to every live listener.
    ///
    /// Listener panics are caught and logged so a broken sink can never fail the load.
    pub fn notify_progress(&self, event: ProgressEvent)
    {
        let listeners: Vec<Arc<ProgressRelay>> =
        {
            let mut locked = self.progress_listeners.lock();
            locked.retain(|l| l.strong_count() > 0);
            locked.iter().filter_map(Weak::upgrade).collect()
        };

        for listener in listeners
        {
            let relayed = std::panic::catch_unwind(AssertUnwindSafe(|| listener.relay(&self.key, event)));
            if relayed.is_err()
            {
                log::warn!("Progress listener panicked while relaying {:?}, ignoring", self.key);
            }
        }
    }
}
fn panic_message(payload: &(dyn Any + Send)) -> &str
{
    match payload.downcast_ref::<&'static str>()
    {
        Some(message) => *message,
        None => payload.downcast_ref::<String>().map_or("<non-string panic>", String::as_str),
    }
}

impl Debug for LoadTask
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_fmt(format_args!("{}({:?}, {:?})", Self::short_type_name(), self.key, self.state()))
    }
}

/// Returned in place of a model that is not loaded yet.
///
/// Await it, then repeat the same access; the repeat finds the same cached task.
pub struct Suspender
{
    task: Arc<LoadTask>,
}
impl Suspender
{
    #[inline] #[must_use]
    pub fn key(&self) -> &ModelKey { self.task.key() }
}
impl Future for Suspender
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output>
    {
        let mut inner = self.task.inner.lock();
        if inner.slot.state().is_terminal()
        {
            return Poll::Ready(());
        }

        if !inner.wakers.iter().any(|w| w.will_wake(cx.waker()))
        {
            inner.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
impl Debug for Suspender
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_fmt(format_args!("Suspender({:?})", self.task.key))
    }
}
