//! Seekable view over a recorded trace.

use algoviz_trace::{Outcome, Recording, Step};
use serde::{Deserialize, Serialize};

/// Where the cursor sits relative to the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineState {
    /// At the beginning
    Stopped,
    /// Somewhere in the middle
    Paused,
    /// Past the last step
    Finished,
}

/// Manual stepping and scrubbing over a [`Recording`].
///
/// The cursor counts delivered steps: `0` means nothing shown yet and
/// `total_steps()` means every step has been shown.
#[derive(Debug, Clone)]
pub struct Timeline {
    recording: Recording,
    cursor: usize,
    state: TimelineState,
    loop_enabled: bool,
}

impl Timeline {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording,
            cursor: 0,
            state: TimelineState::Stopped,
            loop_enabled: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_steps(&self) -> usize {
        self.recording.len()
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Jump to step `index`, clamped to the end. With looping on, the end
    /// wraps back to the beginning.
    pub fn seek(&mut self, index: usize) {
        self.cursor = index.min(self.total_steps());
        self.settle();
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
        self.settle();
    }

    /// Show the next step.
    pub fn step_forward(&mut self) -> Option<&Step> {
        let index = self.cursor;
        if index >= self.total_steps() {
            return None;
        }
        self.cursor += 1;
        self.settle();
        self.recording.get(index)
    }

    fn settle(&mut self) {
        let total = self.total_steps();
        if self.loop_enabled && self.cursor >= total {
            self.cursor = 0;
        }
        self.state = if self.cursor == total && total > 0 {
            TimelineState::Finished
        } else if self.cursor == 0 {
            TimelineState::Stopped
        } else {
            TimelineState::Paused
        };
    }

    /// Un-show the last step.
    pub fn step_backward(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.settle();
        }
    }

    /// Steps shown so far, in order.
    pub fn shown(&self) -> &[Step] {
        &self.recording.steps()[..self.cursor]
    }

    /// Most recently shown step.
    pub fn current_step(&self) -> Option<&Step> {
        self.shown().last()
    }

    /// Outcome, once the cursor has reached the end.
    pub fn outcome(&self) -> Option<&Outcome> {
        (self.cursor == self.total_steps()).then(|| self.recording.outcome())
    }

    /// Unshown steps as a new recording, for handing to a controller.
    pub fn remaining(&self) -> Recording {
        Recording::new(
            self.recording.steps()[self.cursor..].to_vec(),
            self.recording.outcome().clone(),
        )
    }

    /// Fraction shown, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        if self.recording.is_empty() {
            0.0
        } else {
            self.cursor as f64 / self.recording.len() as f64
        }
    }
}

/// Serializable timeline summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineStatus {
    pub cursor: usize,
    pub total_steps: usize,
    pub state: TimelineState,
    pub progress: f64,
    pub loop_enabled: bool,
}

impl From<&Timeline> for TimelineStatus {
    fn from(timeline: &Timeline) -> Self {
        Self {
            cursor: timeline.cursor,
            total_steps: timeline.total_steps(),
            state: timeline.state,
            progress: timeline.progress(),
            loop_enabled: timeline.loop_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_model::{Heap, HeapType, SEED_VALUES};
    use algoviz_trace::heap_insert;
    use proptest::prelude::*;

    fn timeline(n: usize) -> Timeline {
        let steps = (0..n)
            .map(|i| Step::Visit {
                key: i as i64,
                depth: i,
                target: 0,
                frame: i as u64,
            })
            .collect();
        Timeline::new(Recording::new(steps, Outcome::PathNotFound))
    }

    #[test]
    fn timeline_starts_at_zero() {
        let timeline = timeline(10);
        assert_eq!(timeline.cursor(), 0);
        assert_eq!(timeline.state(), TimelineState::Stopped);
        assert!(timeline.current_step().is_none());
    }

    #[test]
    fn seek_clamps_to_bounds() {
        let mut timeline = timeline(10);

        timeline.seek(5);
        assert_eq!(timeline.cursor(), 5);
        assert_eq!(timeline.current_step().map(Step::frame), Some(4));

        timeline.seek(100);
        assert_eq!(timeline.cursor(), 10);
        assert_eq!(timeline.state(), TimelineState::Finished);
        assert_eq!(timeline.outcome(), Some(&Outcome::PathNotFound));

        timeline.seek(0);
        assert_eq!(timeline.state(), TimelineState::Stopped);
    }

    #[test]
    fn step_forward_stops_at_end() {
        let mut timeline = timeline(3);
        for _ in 0..3 {
            assert!(timeline.step_forward().is_some());
        }
        assert_eq!(timeline.state(), TimelineState::Finished);
        assert!(timeline.step_forward().is_none());
    }

    #[test]
    fn step_backward_pauses() {
        let mut timeline = timeline(3);
        timeline.step_forward();
        timeline.step_forward();
        timeline.step_backward();
        assert_eq!(timeline.cursor(), 1);
        assert_eq!(timeline.state(), TimelineState::Paused);
        assert!(timeline.outcome().is_none());

        timeline.step_backward();
        assert_eq!(timeline.state(), TimelineState::Stopped);
    }

    #[test]
    fn loop_wraps_around() {
        let mut timeline = timeline(3);
        timeline.set_loop(true);
        for _ in 0..3 {
            timeline.step_forward();
        }
        assert_eq!(timeline.cursor(), 0);
        assert_eq!(timeline.state(), TimelineState::Stopped);
        assert_eq!(timeline.step_forward().map(Step::frame), Some(0));
    }

    #[test]
    fn looping_seek_to_end_wraps() {
        let mut timeline = timeline(4);
        timeline.set_loop(true);
        timeline.seek(4);
        assert_eq!(timeline.cursor(), 0);
        assert_eq!(timeline.step_forward().map(Step::frame), Some(0));
    }

    #[test]
    fn enabling_loop_at_the_end_rewinds() {
        let mut timeline = timeline(2);
        timeline.seek(2);
        assert_eq!(timeline.state(), TimelineState::Finished);
        assert!(timeline.step_forward().is_none());

        timeline.set_loop(true);
        assert_eq!(timeline.state(), TimelineState::Stopped);
        assert!(timeline.step_forward().is_some());
    }

    #[test]
    fn remaining_starts_at_cursor() {
        let mut heap = Heap::from_values(HeapType::Max, SEED_VALUES);
        let mut timeline = Timeline::new(heap_insert(&mut heap, 1000));
        timeline.step_forward();
        let rest = timeline.remaining();
        assert_eq!(rest.len(), timeline.total_steps() - 1);
        assert_eq!(rest.steps().first().map(Step::frame), Some(1));
    }

    #[test]
    fn status_conversion() {
        let mut timeline = timeline(10);
        timeline.seek(3);
        let status: TimelineStatus = (&timeline).into();
        assert_eq!(status.cursor, 3);
        assert_eq!(status.total_steps, 10);
        assert!((status.progress - 0.3).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn cursor_stays_in_range(
            len in 0usize..20,
            moves in proptest::collection::vec(0u8..3, 0..60),
        ) {
            let mut timeline = timeline(len);
            for m in moves {
                match m {
                    0 => { timeline.step_forward(); }
                    1 => timeline.step_backward(),
                    _ => timeline.seek(timeline.cursor() * 2 + 1),
                }
                prop_assert!(timeline.cursor() <= timeline.total_steps());
                prop_assert!((0.0..=1.0).contains(&timeline.progress()));
                prop_assert_eq!(timeline.shown().len(), timeline.cursor());
            }
        }
    }
}
