// Fetchers and sinks shared by the loader tests
use crate::{yield_now, FetchFault, FetchRequest, ProgressEvent, ProgressSink, ResourceFetcher};
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt};
use glam::Vec3;
use math_kiln::AABB;
use parking_lot::Mutex;
use scene_kiln::{RawLoadResult, RawMesh};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn one_mesh(name: &str, x: f32, y: f32, z: f32) -> RawLoadResult
{
    let half = Vec3::new(x, y, z) / 2.0;
    RawLoadResult
    {
        meshes: vec![RawMesh::new(name).with_bounds(AABB::new(-half, half))],
        loader_name: Some("test".to_string()),
        ..Default::default()
    }
}

type FetchResult = Result<RawLoadResult, FetchFault>;

// Each fetch waits until the test opens its gate (in call order)
#[derive(Default)]
pub struct GatedFetcher
{
    calls: AtomicUsize,
    gates: Mutex<VecDeque<oneshot::Sender<FetchResult>>>,
    requests: Mutex<Vec<(String, String, Option<String>)>>,
}
impl GatedFetcher
{
    pub fn calls(&self) -> usize
    {
        self.calls.load(Ordering::SeqCst)
    }

    // (root_url, file_name, plugin_extension) of every fetch so far
    pub fn requests(&self) -> Vec<(String, String, Option<String>)>
    {
        self.requests.lock().clone()
    }

    pub fn open(&self, result: FetchResult)
    {
        let gate = self.gates.lock().pop_front().expect("No fetch is waiting");
        let _ = gate.send(result);
    }

    // drop the oldest fetch's sender without a result
    pub fn abandon(&self)
    {
        drop(self.gates.lock().pop_front().expect("No fetch is waiting"));
    }
}
impl ResourceFetcher for GatedFetcher
{
    fn name(&self) -> &str { "gated" }

    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, FetchResult>
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((request.root_url, request.file_name, request.plugin_extension));

        let (send, recv) = oneshot::channel();
        self.gates.lock().push_back(send);
        async move
        {
            recv.await.unwrap_or(Err(FetchFault::Unknown))
        }.boxed()
    }
}

// Reports `steps` progress events then yields one mesh
pub struct SteppedFetcher
{
    pub steps: u64,
}
impl ResourceFetcher for SteppedFetcher
{
    fn name(&self) -> &str { "stepped" }

    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, FetchResult>
    {
        let steps = self.steps;
        async move
        {
            for i in 1..=steps
            {
                request.progress.report(ProgressEvent::new(i, Some(steps)));
                yield_now().await;
            }
            Ok(one_mesh(&request.file_name, 1.0, 1.0, 1.0))
        }.boxed()
    }
}

#[derive(Default)]
pub struct RecordingSink
{
    events: Mutex<Vec<ProgressEvent>>,
}
impl RecordingSink
{
    pub fn loaded(&self) -> Vec<u64>
    {
        self.events.lock().iter().map(|e| e.loaded).collect()
    }
}
impl ProgressSink for RecordingSink
{
    fn push(&self, event: ProgressEvent)
    {
        self.events.lock().push(event);
    }
}
