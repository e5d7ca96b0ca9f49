//! Progress signals emitted while an integral is computed.

use crossbeam_channel::Sender;

/// Stage of a computation that has just been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The driver is about to start (tabulation + integration).
    BeginComputation,
    /// All factor tables are finished.
    FinishTabulation,
    /// All worker threads are joined and the result is scaled.
    FinishIntegration,
}

/// Receiver of progress signals.
pub trait ProgressSink {
    fn signal(&mut self, stage: Stage);
}

/// Sink that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn signal(&mut self, _stage: Stage) {}
}

/// Forward signals to another thread. A disconnected receiver is ignored.
impl ProgressSink for Sender<Stage> {
    fn signal(&mut self, stage: Stage) {
        let _ = self.send(stage);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn signal(&mut self, stage: Stage) {
        (**self).signal(stage);
    }
}
