//! Buffered traces.

use serde::{Deserialize, Serialize};

use crate::step::{Outcome, Progress, Step, StepTrace};

/// A fully materialised trace, kept for scrubbing and replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    steps: Vec<Step>,
    outcome: Outcome,
}

impl Recording {
    pub fn new(steps: Vec<Step>, outcome: Outcome) -> Self {
        Self { steps, outcome }
    }

    /// Drain a trace to completion.
    pub fn capture<T: StepTrace>(mut trace: T) -> Self {
        let mut steps = Vec::new();
        loop {
            match trace.advance() {
                Progress::Step(step) => steps.push(step),
                Progress::Finished(outcome) => return Self::new(steps, outcome),
            }
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Replay a copy of this recording.
    pub fn replay(&self) -> Replay {
        self.clone().into_replay()
    }

    pub fn into_replay(self) -> Replay {
        Replay {
            steps: self.steps.into_iter(),
            outcome: self.outcome,
        }
    }
}

/// A recording being drained as a trace.
#[derive(Debug)]
pub struct Replay {
    steps: std::vec::IntoIter<Step>,
    outcome: Outcome,
}

impl StepTrace for Replay {
    fn advance(&mut self) -> Progress {
        match self.steps.next() {
            Some(step) => Progress::Step(step),
            None => Progress::Finished(self.outcome.clone()),
        }
    }
}

/// Appends steps with consecutive frame numbers.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    steps: Vec<Step>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_frame(&self) -> u64 {
        self.steps.len() as u64
    }

    pub(crate) fn record(&mut self, make: impl FnOnce(u64) -> Step) {
        let step = make(self.next_frame());
        self.steps.push(step);
    }

    pub(crate) fn finish(self, outcome: Outcome) -> Recording {
        Recording::new(self.steps, outcome)
    }
}
