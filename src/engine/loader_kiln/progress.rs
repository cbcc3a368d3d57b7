use crate::ModelKey;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent
{
    pub loaded: u64,
    pub total: u64,
    pub length_computable: bool, // false if total is unknown
}
impl ProgressEvent
{
    #[must_use]
    pub fn new(loaded: u64, total: Option<u64>) -> Self
    {
        Self
        {
            loaded,
            total: total.unwrap_or(0),
            length_computable: total.is_some(),
        }
    }

    // 0..=1, None if the total length is unknown
    #[must_use]
    pub fn fraction(&self) -> Option<f32>
    {
        match (self.length_computable, self.total)
        {
            (false, _) => None,
            (true, 0) => Some(1.0),
            (true, total) => Some((self.loaded.min(total) as f64 / total as f64) as f32),
        }
    }
}

// Fire-and-forget receiver of load progress. Must not block
pub trait ProgressSink: Send + Sync
{
    fn push(&self, event: ProgressEvent);
}

/// Forwards progress from load tasks to a sink.
///
/// Tasks only hold weak references to relays; the loader that created the relay owns it.
pub struct ProgressRelay
{
    sink: Arc<dyn ProgressSink>,
}
impl ProgressRelay
{
    #[must_use]
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self
    {
        Self { sink }
    }

    pub fn relay(&self, key: &ModelKey, event: ProgressEvent)
    {
        log::trace!("{key} progress {}/{}", event.loaded, event.total);
        self.sink.push(event);
    }
}

/// A sink that keeps only the most recent event.
#[derive(Default)]
pub struct LastProgress
{
    last: Mutex<Option<ProgressEvent>>,
}
impl LastProgress
{
    #[must_use]
    pub fn last(&self) -> Option<ProgressEvent>
    {
        *self.last.lock()
    }

    pub fn clear(&self)
    {
        *self.last.lock() = None;
    }
}
impl ProgressSink for LastProgress
{
    fn push(&self, event: ProgressEvent)
    {
        *self.last.lock() = Some(event);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn fraction()
    {
        assert_eq!(None, ProgressEvent::new(10, None).fraction());
        assert_eq!(Some(0.5), ProgressEvent::new(50, Some(100)).fraction());
        assert_eq!(Some(1.0), ProgressEvent::new(0, Some(0)).fraction());
        assert_eq!(Some(1.0), ProgressEvent::new(200, Some(100)).fraction());
    }

    #[test]
    fn last_progress()
    {
        let sink = Arc::new(LastProgress::default());
        assert_eq!(None, sink.last());

        let relay = ProgressRelay::new(sink.clone());
        let key = ModelKey::new("models/", "robot.glb");
        relay.relay(&key, ProgressEvent::new(1, Some(3)));
        relay.relay(&key, ProgressEvent::new(2, Some(3)));
        assert_eq!(Some(ProgressEvent::new(2, Some(3))), sink.last());

        sink.clear();
        assert_eq!(None, sink.last());
    }
}
