//! Integration tests for batch commands driving the animation engine.
//!
//! A batch edit touches two subsystems: the plan mutates the composition
//! while the queue narrates per-clip progress. These tests run both sides
//! against the same command.

use promptcut_anim::{AnimState, AnimationQueueEngine, ClipAnimation, ManualClock, OperationKind, QueueState};
use promptcut_timeline::{BatchCutPlan, CaptionPlan, Clip, ClipKind, Composition};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────

fn video_comp(count: usize, each_secs: f64) -> Composition {
    let mut comp = Composition::new();
    for i in 0..count {
        let start = i as f64 * each_secs;
        comp.add(
            Clip::new(format!("clip{i}"), ClipKind::Video, 0, start, start + each_secs)
                .with_source(format!("media/clip{i}.mp4")),
        );
    }
    comp
}

fn engine() -> (AnimationQueueEngine, ManualClock) {
    let clock = ManualClock::new();
    let engine = AnimationQueueEngine::with_clock(clock.clone()).with_seed(11);
    (engine, clock)
}

// ── "Cut every clip" end to end ────────────────────────────────

#[test]
fn batch_cut_narrated_per_clip() {
    let mut comp = video_comp(3, 10.0);
    let mut rng = SmallRng::seed_from_u64(3);
    let (mut engine, clock) = engine();

    // One queue item per video clip, in track order.
    let items: Vec<ClipAnimation> = comp
        .clips_on_track(0)
        .iter()
        .map(|c| ClipAnimation::new(c.id, OperationKind::Cut))
        .collect();
    engine.start_animation("cut every clip", items);

    let reports = BatchCutPlan::new(0.5, 0.5).apply(&mut comp, &mut rng).unwrap();
    assert_eq!(reports.len(), 3);

    // Narrate each edit as it lands: process, simulate, complete.
    for report in &reports {
        let clip_id = engine.process_next_clip().unwrap();
        assert_eq!(clip_id, report.clip_id);
        engine.simulate_progress(clip_id, 0.5);
        clock.advance(0.5);
        engine.run_due();
        engine.complete_clip_animation(clip_id);
    }

    assert_eq!(engine.overall_progress(), 100.0);
    assert!(engine.process_next_clip().is_none());
    assert_eq!(engine.active().unwrap().state, QueueState::Completed);

    let archived = engine.complete_animation().unwrap();
    assert!(engine.history().any(|q| q.id == archived));
}

#[test]
fn failed_edit_keeps_rest_of_editor_usable() {
    let mut comp = video_comp(2, 10.0);
    let (mut engine, _clock) = engine();

    let items: Vec<ClipAnimation> = comp
        .clips_on_track(0)
        .iter()
        .map(|c| ClipAnimation::new(c.id, OperationKind::Overlay))
        .collect();
    engine.start_animation("overlay a logo on every clip", items);

    let first = engine.process_next_clip().unwrap();
    engine.fail_clip_animation(first, "missing overlay asset");
    engine.fail_animation().unwrap();

    // The queue is gone but its partial state survives for diagnostics...
    assert!(engine.active().is_none());
    let archived = engine.history().last().unwrap();
    assert_eq!(archived.state, QueueState::Error);
    assert_eq!(archived.item(first).unwrap().state, AnimState::Error);

    // ...and the clip collection is untouched by the failure.
    assert_eq!(comp.clip_count(), 2);
    assert!(comp.find(first).is_some());
}

// ── Caption batches ────────────────────────────────────────────

#[test]
fn caption_batch_matches_caption_plan() {
    let comp = video_comp(2, 10.0); // 20s of content
    let (mut engine, _clock) = engine();

    let plan = CaptionPlan::new(comp.duration(), 3.0);
    engine.start_caption_batch("add captions every 3s", comp.duration(), 3.0);

    let queue = engine.active().unwrap();
    assert_eq!(queue.items.len(), plan.slot_count());
    assert_eq!(queue.items.len(), 7); // ceil(20 / 3)
}

#[test]
fn caption_slots_place_without_overlap() {
    let mut comp = video_comp(2, 10.0);
    let plan = CaptionPlan::new(comp.duration(), 3.0);

    // Captions land on their own lane, one text clip per slot.
    let caption_track = comp.max_track().unwrap() + 1;
    for (i, slot) in plan.slots.iter().enumerate() {
        assert!(comp.add(Clip::new(
            format!("caption {i}"),
            ClipKind::Text,
            caption_track,
            slot.start,
            slot.end,
        )));
    }

    let captions = comp.clips_on_track(caption_track);
    assert_eq!(captions.len(), plan.slot_count());
    for pair in captions.windows(2) {
        assert!(pair[0].end <= pair[1].start + 1e-9);
    }
    // The last slot is clipped to the timeline end.
    assert_eq!(captions.last().unwrap().end, comp.duration());
}

// ── Interleaved timers across items ────────────────────────────

#[test]
fn interleaved_progress_timers_stay_independent() {
    let (mut engine, clock) = engine();
    let items = vec![
        ClipAnimation::new(uuid::Uuid::new_v4(), OperationKind::Cut),
        ClipAnimation::new(uuid::Uuid::new_v4(), OperationKind::Cut),
    ];
    let (a, b) = (items[0].clip_id, items[1].clip_id);
    engine.start_animation("cut every clip", items);

    // Start both items and let their timers interleave: a ticks every
    // 0.1s, b every 0.15s. Staggered start, no real concurrency.
    assert_eq!(engine.process_next_clip(), Some(a));
    engine.simulate_progress(a, 1.0);
    clock.advance(0.2);
    engine.run_due();

    assert_eq!(engine.process_next_clip(), Some(b));
    engine.simulate_progress(b, 1.5);

    clock.advance(2.0);
    engine.run_due();

    let pa = engine.clip_progress(a).unwrap();
    let pb = engine.clip_progress(b).unwrap();
    assert!(pa > 0.0 && pa <= 100.0);
    assert!(pb > 0.0 && pb <= 100.0);

    // Completing in queue order still works after interleaving.
    engine.complete_clip_animation(a);
    engine.complete_clip_animation(b);
    assert!(engine.process_next_clip().is_none());
    assert_eq!(engine.active().unwrap().state, QueueState::Completed);
}
