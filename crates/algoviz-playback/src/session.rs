//! One model bound to one controller.
//!
//! A session owns its model outright. Commands that start a run are refused
//! while another run is active; commands that edit the model cancel the
//! active run first.

use std::sync::Arc;

use algoviz_model::{parse_key, Bst, Coord, Grid, Heap, HeapType, SkipList};
use algoviz_trace::{
    heap_insert, heap_remove_root, plan, skip_delete, skip_insert, skip_search, tree_delete,
    tree_insert, tree_search, SearchKind, Step, StepTrace,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::controller::{Completion, PlaybackController, PlaybackHandle, PlaybackState};
use crate::error::{Error, Result};
use crate::speed::SpeedControl;

/// Receives what a run produces.
pub trait Renderer: Send + Sync + 'static {
    fn step(&self, step: Step);
    fn complete(&self, completion: Completion);
}

/// Everything a run emits, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Step(Step),
    Complete(Completion),
}

impl Renderer for mpsc::UnboundedSender<PlaybackEvent> {
    fn step(&self, step: Step) {
        let _ = self.send(PlaybackEvent::Step(step));
    }

    fn complete(&self, completion: Completion) {
        let _ = self.send(PlaybackEvent::Complete(completion));
    }
}

/// A model, its playback controller and its speed setting.
pub struct Session<M> {
    model: M,
    controller: PlaybackController,
    speed: SpeedControl,
    renderer: Arc<dyn Renderer>,
    active: Option<PlaybackHandle>,
}

impl<M> Session<M> {
    pub fn new(model: M, speed: SpeedControl, renderer: Arc<dyn Renderer>) -> Self {
        Self::with_controller(model, speed, renderer, PlaybackController::new())
    }

    pub fn with_controller(
        model: M,
        speed: SpeedControl,
        renderer: Arc<dyn Renderer>,
        controller: PlaybackController,
    ) -> Self {
        Self {
            model,
            controller,
            speed,
            renderer,
            active: None,
        }
    }

    /// A session reporting into a channel.
    pub fn channel(
        model: M,
        speed: SpeedControl,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(model, speed, Arc::new(tx)), rx)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn speed(&self) -> &SpeedControl {
        &self.speed
    }

    /// Takes effect at the next step boundary of an active run.
    pub fn set_speed(&self, speed: f64) -> Result<()> {
        self.speed.set_speed(speed)
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    /// Cancel the active run, if any.
    pub fn cancel(&mut self) -> bool {
        self.active.as_ref().is_some_and(PlaybackHandle::cancel)
    }

    /// Wait for the most recent run to finish.
    pub async fn join(&mut self) -> Option<Result<Completion>> {
        let handle = self.active.take()?;
        Some(handle.join().await)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.controller.is_running() {
            warn!("run rejected: a run is already active");
            return Err(Error::RunAlreadyActive);
        }
        Ok(())
    }

    /// Cancel, then hand out the model for editing.
    fn edit(&mut self) -> &mut M {
        if self.cancel() {
            debug!("cancelled active run before editing the model");
        }
        &mut self.model
    }

    fn play<T: StepTrace + 'static>(&mut self, trace: T) -> Result<()> {
        let on_step = self.renderer.clone();
        let on_complete = self.renderer.clone();
        let handle = self.controller.start(
            trace,
            self.speed.clone(),
            move |step| on_step.step(step),
            move |completion| on_complete.complete(completion),
        )?;
        self.active = Some(handle);
        Ok(())
    }
}

impl Session<Grid> {
    /// Search from start to end. Rejected before any step if a run is active
    /// or an endpoint is missing.
    pub fn run(&mut self, kind: SearchKind) -> Result<()> {
        self.ensure_idle()?;
        let trace = plan(&self.model, kind)?;
        self.play(trace)
    }

    pub fn set_obstacle(&mut self, coord: Coord, obstacle: bool) -> Result<()> {
        Ok(self.edit().set_obstacle(coord, obstacle)?)
    }

    pub fn toggle_obstacle(&mut self, coord: Coord) -> Result<bool> {
        Ok(self.edit().toggle_obstacle(coord)?)
    }

    pub fn set_start(&mut self, coord: Coord) -> Result<()> {
        Ok(self.edit().set_start(coord)?)
    }

    pub fn set_end(&mut self, coord: Coord) -> Result<()> {
        Ok(self.edit().set_end(coord)?)
    }

    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        Ok(self.edit().resize(width, height)?)
    }

    /// Clear obstacles and endpoints.
    pub fn reset(&mut self) {
        self.edit().reset();
    }

    pub fn scatter_obstacles<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> usize {
        self.edit().scatter_obstacles(count, rng)
    }
}

impl Session<Bst> {
    /// Insert a key entered as text.
    pub fn insert(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;
        let key = parse_key(input)?;
        let recording = tree_insert(&mut self.model, key);
        self.play(recording.into_replay())
    }

    pub fn search(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;
        let key = parse_key(input)?;
        let recording = tree_search(&self.model, key);
        self.play(recording.into_replay())
    }

    pub fn delete(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;
        let key = parse_key(input)?;
        let recording = tree_delete(&mut self.model, key);
        self.play(recording.into_replay())
    }
}

impl Session<Heap> {
    pub fn insert(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;
        let value = parse_key(input)?;
        let recording = heap_insert(&mut self.model, value);
        self.play(recording.into_replay())
    }

    pub fn remove_root(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let recording = heap_remove_root(&mut self.model);
        self.play(recording.into_replay())
    }

    /// Switch orientation, rebuilding the heap.
    pub fn set_heap_type(&mut self, heap_type: HeapType) {
        self.edit().set_heap_type(heap_type);
    }

    /// Replace the heap with random values.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let heap_type = self.model.heap_type();
        *self.edit() = Heap::random(heap_type, rng);
    }
}

impl Session<SkipList> {
    pub fn insert(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;
        let value = parse_key(input)?;
        let recording = skip_insert(&mut self.model, value);
        self.play(recording.into_replay())
    }

    pub fn search(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;
        let value = parse_key(input)?;
        let recording = skip_search(&self.model, value);
        self.play(recording.into_replay())
    }

    pub fn delete(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;
        let value = parse_key(input)?;
        let recording = skip_delete(&mut self.model, value);
        self.play(recording.into_replay())
    }

    pub fn set_max_height(&mut self, max_height: usize) -> Result<()> {
        Ok(self.edit().set_max_height(max_height)?)
    }

    pub fn set_branching_factor(&mut self, branching_factor: u32) -> Result<()> {
        Ok(self.edit().set_branching_factor(branching_factor)?)
    }
}
