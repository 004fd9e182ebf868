//! End-to-end playback scenarios on a paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use algoviz_model::{Bst, Coord, Grid, Heap, HeapType, SkipList, SEED_VALUES};
use algoviz_playback::{
    Completion, Error, PlaybackController, PlaybackEvent, PlaybackState, Session, SpeedControl,
};
use algoviz_trace::{heap_remove_root, plan, Recording, SearchKind, Status, Step};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

fn open_grid() -> Grid {
    Grid::with_default_endpoints(10, 10).unwrap()
}

async fn drain(rx: &mut UnboundedReceiver<PlaybackEvent>) -> (Vec<Step>, Completion) {
    let mut steps = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            PlaybackEvent::Step(step) => steps.push(step),
            PlaybackEvent::Complete(done) => return (steps, done),
        }
    }
    panic!("channel closed before completion");
}

#[tokio::test(start_paused = true)]
async fn open_grid_searches_find_19_cell_paths() {
    for kind in [SearchKind::AStar, SearchKind::BreadthFirst] {
        let (mut session, mut rx) = Session::channel(open_grid(), SpeedControl::default());
        session.run(kind).unwrap();
        let (steps, done) = drain(&mut rx).await;

        assert_eq!(done.status, Status::Found, "{kind}");
        assert_eq!(done.path().map(<[_]>::len), Some(19));
        assert_eq!(done.steps_delivered, steps.len() as u64);
        assert_eq!(session.state(), PlaybackState::Completed);
    }
}

#[tokio::test(start_paused = true)]
async fn encircled_end_is_not_found() {
    let mut grid = Grid::with_default_endpoints(5, 5).unwrap();
    grid.set_obstacle(Coord::new(3, 0), true).unwrap();
    grid.set_obstacle(Coord::new(4, 1), true).unwrap();

    for kind in [SearchKind::AStar, SearchKind::BreadthFirst] {
        let (mut session, mut rx) = Session::channel(grid.clone(), SpeedControl::default());
        session.run(kind).unwrap();
        let (_, done) = drain(&mut rx).await;
        assert_eq!(done.status, Status::NotFound, "{kind}");
        assert!(done.path().is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn walled_in_interior_end_is_not_found() {
    let mut grid = open_grid();
    let end = Coord::new(5, 5);
    grid.set_end(end).unwrap();
    for neighbor in [(5, 4), (6, 5), (5, 6), (4, 5)] {
        grid.set_obstacle(Coord::new(neighbor.0, neighbor.1), true).unwrap();
    }

    for kind in [SearchKind::AStar, SearchKind::BreadthFirst] {
        let speed = SpeedControl::new(100.0).unwrap();
        let (mut session, mut rx) = Session::channel(grid.clone(), speed);
        session.run(kind).unwrap();
        let (steps, done) = drain(&mut rx).await;
        assert_eq!(done.status, Status::NotFound, "{kind}");
        assert!(steps.iter().all(|s| !s.visited().unwrap_or_default().contains(&end)));
    }
}

#[tokio::test(start_paused = true)]
async fn second_start_during_search_is_rejected() {
    let (mut session, mut rx) = Session::channel(open_grid(), SpeedControl::default());
    session.run(SearchKind::AStar).unwrap();

    let err = session.run(SearchKind::BreadthFirst).unwrap_err();
    assert!(matches!(err, Error::RunAlreadyActive));
    assert!(session.is_running());

    let (_, done) = drain(&mut rx).await;
    assert_eq!(done.status, Status::Found);
    assert_eq!(done.path().map(<[_]>::len), Some(19));
}

#[tokio::test(start_paused = true)]
async fn structural_run_rejected_while_search_active() {
    let controller = PlaybackController::new();
    let grid_trace = plan(&open_grid(), SearchKind::BreadthFirst).unwrap();
    let first = controller
        .start(grid_trace, SpeedControl::default(), |_| {}, |_| {})
        .unwrap();

    let mut heap = Heap::from_values(HeapType::Max, SEED_VALUES);
    let err = controller
        .start(
            heap_remove_root(&mut heap).into_replay(),
            SpeedControl::default(),
            |_| {},
            |_| {},
        )
        .unwrap_err();
    assert!(matches!(err, Error::RunAlreadyActive));

    assert_eq!(first.join().await.unwrap().status, Status::Found);
}

#[tokio::test(start_paused = true)]
async fn steps_are_spaced_by_the_interval() {
    let controller = PlaybackController::new();
    let times = Arc::new(Mutex::new(Vec::new()));
    let sink = times.clone();
    let started = Instant::now();

    let mut heap = Heap::from_values(HeapType::Max, [50, 30, 20]);
    let recording = algoviz_trace::heap_insert(&mut heap, 60);
    assert_eq!(recording.len(), 3);

    let handle = controller
        .start(
            recording.into_replay(),
            SpeedControl::new(4.0).unwrap(),
            move |_| sink.lock().unwrap().push(started.elapsed()),
            |_| {},
        )
        .unwrap();
    handle.join().await.unwrap();

    let times = times.lock().unwrap().clone();
    assert_eq!(
        times,
        vec![Duration::ZERO, Duration::from_millis(250), Duration::from_millis(500)]
    );
}

#[tokio::test(start_paused = true)]
async fn speed_change_applies_at_next_wait() {
    let controller = PlaybackController::new();
    let speed = SpeedControl::new(1.0).unwrap();
    let knob = speed.clone();
    let times = Arc::new(Mutex::new(Vec::new()));
    let sink = times.clone();
    let started = Instant::now();

    let trace = plan(&open_grid(), SearchKind::AStar).unwrap();
    let handle = controller
        .start(
            trace,
            speed,
            move |step: Step| {
                sink.lock().unwrap().push(started.elapsed());
                if step.frame() == 1 {
                    knob.set_speed(10.0).unwrap();
                }
            },
            |_| {},
        )
        .unwrap();
    let done = handle.join().await.unwrap();
    assert_eq!(done.status, Status::Found);

    let times = times.lock().unwrap().clone();
    assert_eq!(times[1] - times[0], Duration::from_secs(1));
    assert_eq!(times[2] - times[1], Duration::from_millis(100));
    assert_eq!(times[3] - times[2], Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent_and_silences_callbacks() {
    let controller = PlaybackController::new();
    let steps = Arc::new(AtomicUsize::new(0));
    let completions = Arc::new(AtomicUsize::new(0));
    let (s, c) = (steps.clone(), completions.clone());

    let handle = controller
        .start(
            plan(&open_grid(), SearchKind::BreadthFirst).unwrap(),
            SpeedControl::default(),
            move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            },
            move |done: Completion| {
                assert_eq!(done.status, Status::Cancelled);
                c.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

    tokio::time::sleep(Duration::from_millis(450)).await;
    let delivered = steps.load(Ordering::SeqCst);
    assert_eq!(delivered, 3);

    let canceller = handle.canceller();
    assert!(handle.cancel());
    assert!(!handle.cancel());
    assert!(!canceller.cancel());

    let done = handle.join().await.unwrap();
    assert_eq!(done.steps_delivered, delivered as u64);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!canceller.cancel());
    assert_eq!(steps.load(Ordering::SeqCst), delivered);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_after_completion_is_a_no_op() {
    let controller = PlaybackController::new();
    let completions = Arc::new(AtomicUsize::new(0));
    let c = completions.clone();

    let tree_trace = algoviz_trace::tree_search(&Bst::from_keys([5, 3, 7]), 7);
    let handle = controller
        .start(tree_trace.into_replay(), SpeedControl::default(), |_| {}, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    let canceller = handle.canceller();
    let done = handle.join().await.unwrap();
    assert_eq!(done.status, Status::Found);

    assert!(!canceller.cancel());
    assert_eq!(controller.state(), PlaybackState::Completed);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn renderer_may_cancel_from_inside_a_step() {
    let controller = PlaybackController::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let slot: Arc<Mutex<Option<algoviz_playback::Canceller>>> = Arc::new(Mutex::new(None));
    let from_step = slot.clone();

    let handle = controller
        .start(
            plan(&open_grid(), SearchKind::AStar).unwrap(),
            SpeedControl::default(),
            move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                    if let Some(canceller) = from_step.lock().unwrap().as_ref() {
                        canceller.cancel();
                    }
                }
            },
            |_| {},
        )
        .unwrap();
    *slot.lock().unwrap() = Some(handle.canceller());

    let done = handle.join().await.unwrap();
    assert_eq!(done.status, Status::Cancelled);
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn skip_list_session_builds_sentinels_from_config() {
    let list = SkipList::with_seed(10, 3, 5).unwrap();
    assert_eq!(list.header_levels(), 10);
    assert_eq!(list.nil_levels(), 10);

    let (mut session, mut rx) = Session::channel(list, SpeedControl::new(50.0).unwrap());
    for v in ["30", "10", "20"] {
        session.insert(v).unwrap();
        drain(&mut rx).await;
        session.join().await;
    }
    session.search("20").unwrap();
    let (steps, done) = drain(&mut rx).await;
    assert_eq!(done.status, Status::Found);
    assert!(steps.iter().all(|s| matches!(s, Step::Advance { target: 20, .. })));
    assert_eq!(session.model().values(), vec![10, 20, 30]);
}

#[test]
fn recordings_replay_identically() {
    let mut heap = Heap::from_values(HeapType::Min, SEED_VALUES);
    let recording = heap_remove_root(&mut heap);
    assert_eq!(Recording::capture(recording.replay()), recording);
    assert_eq!(recording.outcome().value(), Some(4));
}

#[test]
fn immediate_sleeper_runs_under_block_on() {
    use algoviz_playback::Immediate;

    tokio_test::block_on(async {
        let controller = PlaybackController::with_sleeper(Arc::new(Immediate));
        let trace = plan(&open_grid(), SearchKind::BreadthFirst).unwrap();
        let started = controller.start(trace, SpeedControl::default(), |_| {}, |_| {});
        let handle = tokio_test::assert_ok!(started);
        let done = tokio_test::assert_ok!(handle.join().await);
        assert_eq!(done.path().map(<[_]>::len), Some(19));
    });
}
