//! Mutation quiescence detector.
//!
//! Decides when the comment thread has stopped changing. Every observed
//! batch restarts a quiet-interval debounce; when it expires the annotation
//! pass runs inside a suppression window so its own writes are not mistaken
//! for host updates. The window closes on the next scheduling turn, not
//! synchronously, because the pass's own mutation records are delivered
//! after it returns but before the next turn begins.
//!
//! Once a loaded comment exists the detector disconnects for good. A thread
//! that paginates further after that point is not re-annotated unless the
//! host asks for it explicitly.

use std::time::Duration;

use crate::engine::timer::DelayedTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Observing,
    /// Our own annotation writes are in flight.
    Suppressed,
}

/// Kind of one mutation record delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    CharacterData,
    Attributes,
}

/// What happened to a delivered batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchDisposition {
    /// Debounce (re)started.
    Debounced,
    /// Delivered inside the suppression window; ignored.
    Suppressed,
    /// Observation already stopped; ignored.
    Disconnected,
    /// Attribute-only batch, which is not observed.
    Unobserved,
}

impl BatchDisposition {
    /// An observed change that will not lead to a pass on its own.
    pub fn is_dropped(self) -> bool {
        matches!(self, Self::Suppressed | Self::Disconnected)
    }
}

/// The state the detector watches and the pass it triggers.
pub trait QuiescenceTarget {
    /// At least one fully loaded comment is present.
    fn has_loaded_comment(&self) -> bool;
    /// Run the annotation pass to completion.
    fn annotate(&mut self);
}

#[derive(Debug, Clone)]
pub struct QuiescenceDetector {
    phase: Phase,
    connected: bool,
    quiet_interval: Duration,
    debounce: DelayedTask,
    release_pending: bool,
}

impl QuiescenceDetector {
    pub fn new(quiet_interval: Duration) -> Self {
        Self {
            phase: Phase::Observing,
            connected: true,
            quiet_interval,
            debounce: DelayedTask::new(),
            release_pending: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Still accepting mutation batches.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.debounce.deadline()
    }

    /// Setup: the page may already be stable, so behave as if one batch arrived.
    pub fn start(&mut self, now: Duration) -> BatchDisposition {
        self.on_mutations(now, &[MutationKind::ChildList])
    }

    pub fn on_mutations(&mut self, now: Duration, records: &[MutationKind]) -> BatchDisposition {
        if !self.connected {
            return BatchDisposition::Disconnected;
        }
        if !records.is_empty() && records.iter().all(|r| *r == MutationKind::Attributes) {
            return BatchDisposition::Unobserved;
        }
        if self.phase == Phase::Suppressed {
            log::trace!("{} mutation records during suppression ignored", records.len());
            return BatchDisposition::Suppressed;
        }
        self.debounce.schedule(now, self.quiet_interval);
        BatchDisposition::Debounced
    }

    /// Start of a scheduling turn: close a suppression window left open by
    /// the previous turn's pass. Returns true when the window was closed.
    pub fn begin_turn(&mut self) -> bool {
        if !self.release_pending {
            return false;
        }
        self.release_pending = false;
        self.phase = Phase::Observing;
        log::debug!("suppression released");
        true
    }

    /// Run the pass if the debounce expired. Returns true when it ran.
    pub fn poll<T: QuiescenceTarget>(&mut self, now: Duration, target: &mut T) -> bool {
        if !self.debounce.fire_if_due(now) {
            return false;
        }

        if target.has_loaded_comment() {
            log::debug!("loaded comments present, observation stopped");
            self.connected = false;
        }

        self.run_suppressed(target);
        true
    }

    /// Manual re-trigger from the host, e.g. after late pagination. Runs the
    /// pass immediately, connected or not.
    pub fn run_now<T: QuiescenceTarget>(&mut self, target: &mut T) {
        self.debounce.cancel();
        self.run_suppressed(target);
    }

    fn run_suppressed<T: QuiescenceTarget>(&mut self, target: &mut T) {
        self.phase = Phase::Suppressed;
        target.annotate();
        self.release_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeThread {
        loaded: bool,
        passes: usize,
    }

    impl QuiescenceTarget for FakeThread {
        fn has_loaded_comment(&self) -> bool {
            self.loaded
        }
        fn annotate(&mut self) {
            self.passes += 1;
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    const CHILD: &[MutationKind] = &[MutationKind::ChildList];

    #[test]
    fn runs_once_after_quiet_interval() {
        let mut det = QuiescenceDetector::new(ms(1000));
        let mut thread = FakeThread::default();
        assert_eq!(det.start(ms(0)), BatchDisposition::Debounced);
        assert!(!det.poll(ms(999), &mut thread));
        assert!(det.poll(ms(1000), &mut thread));
        assert_eq!(thread.passes, 1);
        assert!(!det.poll(ms(5000), &mut thread));
    }

    #[test]
    fn bursts_keep_pushing_the_deadline() {
        let mut det = QuiescenceDetector::new(ms(1000));
        let mut thread = FakeThread::default();
        det.start(ms(0));
        det.on_mutations(ms(600), CHILD);
        det.on_mutations(ms(1200), &[MutationKind::CharacterData]);
        assert!(!det.poll(ms(2100), &mut thread));
        assert!(det.poll(ms(2200), &mut thread));
        assert_eq!(thread.passes, 1);
    }

    #[test]
    fn own_writes_are_suppressed_until_next_turn() {
        let mut det = QuiescenceDetector::new(ms(1000));
        let mut thread = FakeThread::default();
        det.start(ms(0));
        det.poll(ms(1000), &mut thread);
        assert_eq!(det.phase(), Phase::Suppressed);

        // records produced by the pass itself
        assert_eq!(det.on_mutations(ms(1000), CHILD), BatchDisposition::Suppressed);
        assert_eq!(det.next_deadline(), None);

        assert!(det.begin_turn());
        assert_eq!(det.phase(), Phase::Observing);
        assert!(!det.begin_turn());

        // genuine host update right after
        assert_eq!(det.on_mutations(ms(1001), CHILD), BatchDisposition::Debounced);
        assert!(det.poll(ms(2001), &mut thread));
        assert_eq!(thread.passes, 2);
    }

    #[test]
    fn disconnects_once_a_comment_is_loaded() {
        let mut det = QuiescenceDetector::new(ms(1000));
        let mut thread = FakeThread { loaded: true, passes: 0 };
        det.start(ms(0));
        assert!(det.poll(ms(1000), &mut thread));
        assert!(!det.is_connected());

        det.begin_turn();
        assert_eq!(det.phase(), Phase::Observing);
        assert_eq!(det.on_mutations(ms(1500), CHILD), BatchDisposition::Disconnected);
        assert!(!det.poll(ms(9000), &mut thread));
        assert_eq!(thread.passes, 1);
    }

    #[test]
    fn keeps_observing_while_no_comment_is_loaded() {
        let mut det = QuiescenceDetector::new(ms(1000));
        let mut thread = FakeThread::default();
        det.start(ms(0));
        det.poll(ms(1000), &mut thread);
        assert!(det.is_connected());
    }

    #[test]
    fn attribute_only_batches_are_not_observed() {
        let mut det = QuiescenceDetector::new(ms(1000));
        assert_eq!(
            det.on_mutations(ms(0), &[MutationKind::Attributes]),
            BatchDisposition::Unobserved
        );
        assert_eq!(det.next_deadline(), None);
    }

    #[test]
    fn manual_rerun_after_disconnect() {
        let mut det = QuiescenceDetector::new(ms(1000));
        let mut thread = FakeThread { loaded: true, passes: 0 };
        det.start(ms(0));
        det.poll(ms(1000), &mut thread);
        det.begin_turn();
        assert!(!det.is_connected());

        det.run_now(&mut thread);
        assert_eq!(thread.passes, 2);
        assert_eq!(det.phase(), Phase::Suppressed);
        assert!(det.begin_turn());
    }

    #[test]
    fn ignored_batches_count_as_dropped() {
        assert!(BatchDisposition::Suppressed.is_dropped());
        assert!(BatchDisposition::Disconnected.is_dropped());
        assert!(!BatchDisposition::Debounced.is_dropped());
        assert!(!BatchDisposition::Unobserved.is_dropped());
    }
}
