//! The animation queue engine.
//!
//! One active queue at a time, a bounded history of finished ones, and a
//! timer queue driving per-item progress. Every scheduled step carries the
//! epoch it was created under; clearing or replacing the queue bumps the
//! epoch, so steps from a disposed queue can never mutate a later one.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::queue::{AnimState, AnimationQueue, ClipAnimation, QueueState};

/// Tunable animation constants.
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    /// Discrete steps a simulated item's progress is divided into.
    pub progress_steps: u32,
    /// Per-step jitter as a fraction of the base increment.
    pub jitter_frac: f32,
    /// Finished queues kept for diagnostics.
    pub history_limit: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            progress_steps: 10,
            jitter_frac: 0.3,
            history_limit: 50,
        }
    }
}

// ── Scheduled steps ─────────────────────────────────────────────

/// One pending progress tick. Ordered so the earliest fire time pops first.
#[derive(Debug)]
struct ScheduledStep {
    fire_at: f64,
    /// FIFO tiebreak for equal fire times.
    seq: u64,
    /// Cancellation token: must match the engine epoch to run.
    epoch: u64,
    clip_id: Uuid,
    remaining: u32,
    step_delay: f64,
}

impl PartialEq for ScheduledStep {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}
impl Eq for ScheduledStep {}

impl Ord for ScheduledStep {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and we want the earliest step.
        other
            .fire_at
            .total_cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for ScheduledStep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Engine ──────────────────────────────────────────────────────

/// Drives batch-operation progress visualization.
pub struct AnimationQueueEngine {
    pub config: AnimationConfig,
    clock: Box<dyn Clock>,
    rng: SmallRng,
    active: Option<AnimationQueue>,
    history: VecDeque<AnimationQueue>,
    timers: BinaryHeap<ScheduledStep>,
    epoch: u64,
    next_seq: u64,
    mutations: u64,
}

impl Default for AnimationQueueEngine {
    fn default() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl AnimationQueueEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            config: AnimationConfig::default(),
            clock: Box::new(clock),
            rng: SmallRng::from_entropy(),
            active: None,
            history: VecDeque::new(),
            timers: BinaryHeap::new(),
            epoch: 0,
            next_seq: 0,
            mutations: 0,
        }
    }

    /// Fix the jitter seed (tests).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    // ── Queries ─────────────────────────────────────────────────

    /// The queue currently in flight, if any.
    pub fn active(&self) -> Option<&AnimationQueue> {
        self.active.as_ref()
    }

    /// Finished queues, oldest first, at most `history_limit`.
    pub fn history(&self) -> impl Iterator<Item = &AnimationQueue> {
        self.history.iter()
    }

    /// Overall progress of the active queue, 0 to 100 (0 when idle).
    pub fn overall_progress(&self) -> f32 {
        self.active.as_ref().map_or(0.0, |q| q.overall_progress())
    }

    /// Progress of one item in the active queue.
    pub fn clip_progress(&self, clip_id: Uuid) -> Option<f32> {
        self.active.as_ref()?.item(clip_id).map(|i| i.progress)
    }

    /// State of one item in the active queue.
    pub fn clip_state(&self, clip_id: Uuid) -> Option<AnimState> {
        self.active.as_ref()?.item(clip_id).map(|i| i.state)
    }

    /// Count of state mutations performed so far. Frozen once the queue is
    /// cleared; lets tests verify that stale timers stopped mutating.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Number of progress steps still scheduled.
    pub fn pending_steps(&self) -> usize {
        self.timers.len()
    }

    // ── Transitions ─────────────────────────────────────────────

    /// Begin visualizing a batch command. Every item starts idle and the
    /// queue starts processing. A queue already in flight is archived first
    /// (single active queue, last write wins).
    pub fn start_animation(
        &mut self,
        command_text: impl Into<String>,
        items: Vec<ClipAnimation>,
    ) -> Uuid {
        if let Some(old) = self.active.take() {
            warn!(queue = %old.id, "starting a new batch over an active one");
            self.push_history(old);
        }
        self.invalidate_timers();

        let queue = AnimationQueue::new(command_text, items);
        let id = queue.id;
        info!(queue = %id, items = queue.items.len(), command = %queue.command_text, "batch animation started");
        self.active = Some(queue);
        self.mutations += 1;
        id
    }

    /// Move the first idle item to processing, stamping its start time.
    /// Returns its clip id. When no idle item remains and every item has
    /// completed, the queue itself transitions to completed.
    pub fn process_next_clip(&mut self) -> Option<Uuid> {
        let now = self.clock.now();
        let queue = self.active.as_mut()?;

        if let Some(item) = queue.first_idle_mut() {
            item.state = AnimState::Processing;
            item.started_at = Some(now);
            let clip_id = item.clip_id;
            self.mutations += 1;
            debug!(clip = %clip_id, "clip animation processing");
            return Some(clip_id);
        }

        if queue.all_completed() && queue.state == QueueState::Processing {
            queue.state = QueueState::Completed;
            self.mutations += 1;
            info!(queue = %queue.id, "batch animation completed");
        }
        None
    }

    /// Schedule simulated progress for an item: `progress_steps` ticks
    /// spread over `duration` seconds, each advancing the bar by a jittered
    /// increment. Every tick re-checks that the queue and item are still
    /// live before mutating (see `run_due`).
    pub fn simulate_progress(&mut self, clip_id: Uuid, duration: f64) {
        let Some(queue) = self.active.as_ref() else {
            return;
        };
        if queue.item(clip_id).is_none() {
            warn!(clip = %clip_id, "simulate_progress for unknown clip");
            return;
        }

        let steps = self.config.progress_steps.max(1);
        let step_delay = duration.max(0.0) / steps as f64;
        let step = ScheduledStep {
            fire_at: self.clock.now() + step_delay,
            seq: self.next_seq,
            epoch: self.epoch,
            clip_id,
            remaining: steps,
            step_delay,
        };
        self.next_seq += 1;
        self.timers.push(step);
    }

    /// Fire every scheduled step whose time has come. Steps belonging to a
    /// cleared or replaced queue are dropped silently.
    pub fn run_due(&mut self) {
        let now = self.clock.now();
        loop {
            if !self.timers.peek().is_some_and(|step| step.fire_at <= now) {
                break;
            }
            if let Some(step) = self.timers.pop() {
                self.execute_step(step);
            }
        }
    }

    fn execute_step(&mut self, step: ScheduledStep) {
        if step.epoch != self.epoch {
            debug!(clip = %step.clip_id, "stale progress step dropped");
            return;
        }
        // Liveness: the queue and the specific item must still be active.
        let Some(item) = self
            .active
            .as_mut()
            .and_then(|q| q.item_mut(step.clip_id))
        else {
            debug!(clip = %step.clip_id, "progress step for missing item dropped");
            return;
        };
        if item.state != AnimState::Processing {
            debug!(clip = %step.clip_id, state = ?item.state, "progress step for settled item dropped");
            return;
        }

        let base = 100.0 / self.config.progress_steps.max(1) as f32;
        let jitter = if self.config.jitter_frac > 0.0 {
            let j = self.config.jitter_frac;
            self.rng.gen_range(-j..j)
        } else {
            0.0
        };
        item.progress = (item.progress + base * (1.0 + jitter)).min(100.0);
        self.mutations += 1;

        if step.remaining > 1 {
            self.timers.push(ScheduledStep {
                fire_at: step.fire_at + step.step_delay,
                seq: self.next_seq,
                epoch: step.epoch,
                clip_id: step.clip_id,
                remaining: step.remaining - 1,
                step_delay: step.step_delay,
            });
            self.next_seq += 1;
        }
    }

    /// Mark an item finished: full progress, completed state, end timestamp,
    /// and the queue's current index advanced.
    pub fn complete_clip_animation(&mut self, clip_id: Uuid) -> bool {
        let now = self.clock.now();
        let Some(queue) = self.active.as_mut() else {
            return false;
        };
        let Some(item) = queue.item_mut(clip_id) else {
            return false;
        };
        item.progress = 100.0;
        item.state = AnimState::Completed;
        item.finished_at = Some(now);
        queue.current_index += 1;
        self.mutations += 1;
        debug!(clip = %clip_id, "clip animation completed");
        true
    }

    /// Mark an item failed. One failure fails the whole batch visualization;
    /// the composition itself is untouched.
    pub fn fail_clip_animation(&mut self, clip_id: Uuid, message: impl Into<String>) -> bool {
        let now = self.clock.now();
        let Some(queue) = self.active.as_mut() else {
            return false;
        };
        let Some(item) = queue.item_mut(clip_id) else {
            return false;
        };
        let message = message.into();
        warn!(clip = %clip_id, %message, "clip animation failed");
        item.state = AnimState::Error;
        item.error_message = Some(message);
        item.finished_at = Some(now);
        queue.state = QueueState::Error;
        self.mutations += 1;
        true
    }

    /// Archive the active queue into history and clear the slot.
    pub fn complete_animation(&mut self) -> Option<Uuid> {
        let queue = self.active.take()?;
        let id = queue.id;
        self.push_history(queue);
        self.invalidate_timers();
        self.mutations += 1;
        Some(id)
    }

    /// Mark the active queue failed, then archive it. The partial queue is
    /// preserved in history for diagnostics.
    pub fn fail_animation(&mut self) -> Option<Uuid> {
        let mut queue = self.active.take()?;
        queue.state = QueueState::Error;
        let id = queue.id;
        self.push_history(queue);
        self.invalidate_timers();
        self.mutations += 1;
        Some(id)
    }

    /// Force-clear the active queue without archiving. Used for teardown and
    /// cancellation; idempotent.
    pub fn clear_current_animation(&mut self) {
        if self.active.take().is_some() {
            self.invalidate_timers();
            self.mutations += 1;
            debug!("active animation cleared");
        }
    }

    // ── Internals ───────────────────────────────────────────────

    fn push_history(&mut self, queue: AnimationQueue) {
        self.history.push_back(queue);
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
    }

    /// Bump the epoch so every outstanding step becomes stale, and drop the
    /// backlog eagerly.
    fn invalidate_timers(&mut self) {
        self.epoch += 1;
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::queue::OperationKind;

    fn items(n: usize) -> Vec<ClipAnimation> {
        (0..n)
            .map(|_| ClipAnimation::new(Uuid::new_v4(), OperationKind::Cut))
            .collect()
    }

    fn engine() -> (AnimationQueueEngine, ManualClock) {
        let clock = ManualClock::new();
        let engine = AnimationQueueEngine::with_clock(clock.clone()).with_seed(42);
        (engine, clock)
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut engine, clock) = engine();
        engine.start_animation("cut every clip", items(2));

        let first = engine.process_next_clip().unwrap();
        assert_eq!(engine.clip_state(first), Some(AnimState::Processing));

        engine.simulate_progress(first, 1.0);
        clock.advance(1.0);
        engine.run_due();
        let simulated = engine.clip_progress(first).unwrap();
        assert!(simulated > 0.0 && simulated <= 100.0);

        engine.complete_clip_animation(first);
        assert_eq!(engine.overall_progress(), 50.0);

        let second = engine.process_next_clip().unwrap();
        engine.complete_clip_animation(second);
        assert_eq!(engine.overall_progress(), 100.0);

        // No idle items left and everything completed: queue completes.
        assert!(engine.process_next_clip().is_none());
        assert_eq!(engine.active().unwrap().state, QueueState::Completed);

        engine.complete_animation().unwrap();
        assert!(engine.active().is_none());
        assert_eq!(engine.history().count(), 1);
    }

    #[test]
    fn test_progress_advances_step_by_step() {
        let (mut engine, clock) = engine();
        engine.start_animation("trim", items(1));
        let clip = engine.process_next_clip().unwrap();
        engine.simulate_progress(clip, 10.0);

        // One step per second; each tick lands near 10% ± jitter.
        clock.advance(1.0);
        engine.run_due();
        let after_one = engine.clip_progress(clip).unwrap();
        assert!(after_one > 0.0 && after_one < 20.0);

        clock.advance(4.0);
        engine.run_due();
        let after_five = engine.clip_progress(clip).unwrap();
        assert!(after_five > after_one);

        clock.advance(5.0);
        engine.run_due();
        assert_eq!(engine.pending_steps(), 0);
        assert!(engine.clip_progress(clip).unwrap() <= 100.0);
    }

    #[test]
    fn test_overall_progress_is_monotone() {
        let (mut engine, clock) = engine();
        engine.start_animation("captions", items(3));

        let mut last = engine.overall_progress();
        for _ in 0..3 {
            let clip = engine.process_next_clip().unwrap();
            engine.simulate_progress(clip, 1.0);
            for _ in 0..12 {
                clock.advance(0.1);
                engine.run_due();
                let now = engine.overall_progress();
                assert!(now >= last, "progress regressed: {last} -> {now}");
                last = now;
            }
            engine.complete_clip_animation(clip);
            let now = engine.overall_progress();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_clear_mid_flight_freezes_state() {
        let (mut engine, clock) = engine();
        engine.start_animation("cut", items(1));
        let clip = engine.process_next_clip().unwrap();
        engine.simulate_progress(clip, 1.0);

        clock.advance(0.3);
        engine.run_due();
        assert!(engine.pending_steps() > 0);

        engine.clear_current_animation();
        let frozen = engine.mutation_count();

        // The remaining timer chain must not mutate anything.
        clock.advance(5.0);
        engine.run_due();
        assert_eq!(engine.mutation_count(), frozen);
        assert!(engine.active().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut engine, _clock) = engine();
        engine.clear_current_animation();
        let count = engine.mutation_count();
        engine.clear_current_animation();
        assert_eq!(engine.mutation_count(), count);
    }

    #[test]
    fn test_stale_steps_cannot_touch_replacement_queue() {
        let (mut engine, clock) = engine();
        engine.start_animation("first batch", items(1));
        let clip = engine.process_next_clip().unwrap();
        engine.simulate_progress(clip, 1.0);

        // Replace the queue while steps are pending.
        engine.start_animation("second batch", items(1));
        let second_clip = engine.process_next_clip().unwrap();

        clock.advance(5.0);
        engine.run_due();
        // Progress on the new item only moves via its own simulation.
        assert_eq!(engine.clip_progress(second_clip), Some(0.0));
        assert_eq!(engine.history().count(), 1);
    }

    #[test]
    fn test_item_failure_fails_queue_and_preserves_history() {
        let (mut engine, _clock) = engine();
        engine.start_animation("overlay", items(2));
        let clip = engine.process_next_clip().unwrap();

        engine.fail_clip_animation(clip, "render backend refused");
        assert_eq!(engine.active().unwrap().state, QueueState::Error);
        assert_eq!(engine.clip_state(clip), Some(AnimState::Error));

        let id = engine.fail_animation().unwrap();
        let archived = engine.history().find(|q| q.id == id).unwrap();
        assert_eq!(archived.state, QueueState::Error);
        assert_eq!(
            archived.item(clip).unwrap().error_message.as_deref(),
            Some("render backend refused")
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let (mut engine, _clock) = engine();
        for i in 0..55 {
            engine.start_animation(format!("batch {i}"), items(1));
            engine.complete_animation();
        }
        assert_eq!(engine.history().count(), 50);
        // Oldest entries were truncated.
        assert_eq!(engine.history().next().unwrap().command_text, "batch 5");
    }

    #[test]
    fn test_settled_item_ignores_late_steps() {
        let (mut engine, clock) = engine();
        engine.start_animation("cut", items(1));
        let clip = engine.process_next_clip().unwrap();
        engine.simulate_progress(clip, 1.0);

        engine.complete_clip_animation(clip);
        let frozen = engine.clip_progress(clip).unwrap();
        assert_eq!(frozen, 100.0);

        clock.advance(5.0);
        engine.run_due();
        assert_eq!(engine.clip_progress(clip), Some(100.0));
    }

    #[test]
    fn test_timestamps_come_from_injected_clock() {
        let (mut engine, clock) = engine();
        clock.set(12.0);
        engine.start_animation("cut", items(1));
        let clip = engine.process_next_clip().unwrap();
        clock.set(15.5);
        engine.complete_clip_animation(clip);

        let item = engine.active().unwrap().item(clip).unwrap();
        assert_eq!(item.started_at, Some(12.0));
        assert_eq!(item.finished_at, Some(15.5));
    }
}
