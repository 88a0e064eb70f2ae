use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use keyshape_core::{
    clock::{ManualTicks, PlaybackClock, PlaybackState, TickSource, MAX_QUEUED_EVENTS},
    data::Shape,
    store::{KeyframeStore, Timeline},
    ClockEvent, EngineError, Frame, TickHandle,
};

fn mk_timeline() -> Timeline {
    let mut store = KeyframeStore::new(5.0).unwrap();
    store
        .record(0.0, Shape::from_coords(&[(0.0, 0.0), (10.0, 0.0)]))
        .unwrap();
    store
        .record(4.0, Shape::from_coords(&[(40.0, 0.0), (50.0, 0.0)]))
        .unwrap();
    store.snapshot()
}

fn pending(clock: &PlaybackClock<ManualTicks>) -> TickHandle {
    clock.pending_tick().expect("clock should be waiting for a tick")
}

#[test]
fn first_tick_anchors_then_time_advances() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    assert!(clock.play());
    assert!(!clock.play());

    let frame = clock.tick(pending(&clock), 1000.0, &tl).unwrap().unwrap();
    assert_eq!(frame.time, 0.0);

    let frame = clock.tick(pending(&clock), 3000.0, &tl).unwrap().unwrap();
    assert_abs_diff_eq!(frame.time, 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(frame.shape.points()[0].x, 20.0, epsilon = 1e-9);
}

#[test]
fn playback_wraps_at_total_duration() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    clock.play();
    clock.tick(pending(&clock), 0.0, &tl).unwrap();

    let frame = clock.tick(pending(&clock), 5000.0, &tl).unwrap().unwrap();
    assert_eq!(frame.time, 0.0);
    let frame = clock.tick(pending(&clock), 12_500.0, &tl).unwrap().unwrap();
    assert_abs_diff_eq!(frame.time, 2.5, epsilon = 1e-9);
    assert!(frame.time < clock.total_duration());
}

#[test]
fn play_after_pause_restarts_from_zero() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    clock.play();
    clock.tick(pending(&clock), 0.0, &tl).unwrap();
    clock.tick(pending(&clock), 1500.0, &tl).unwrap();
    assert!(clock.pause());
    assert_eq!(clock.state(), PlaybackState::Stopped);
    assert_abs_diff_eq!(clock.current_time(), 1.5, epsilon = 1e-9);

    // host time moved on while paused; the first tick after play is time 0
    clock.play();
    let frame = clock.tick(pending(&clock), 60_000.0, &tl).unwrap().unwrap();
    assert_eq!(frame.time, 0.0);
    assert_eq!(frame.shape, *tl.get(0.0).unwrap());
    let frame = clock.tick(pending(&clock), 60_500.0, &tl).unwrap().unwrap();
    assert_abs_diff_eq!(frame.time, 0.5, epsilon = 1e-9);

    let events = clock.drain_events();
    assert_eq!(events[0], ClockEvent::Started { time: 0.0 });
    assert_eq!(events[2], ClockEvent::Started { time: 0.0 });
}

#[test]
fn seek_while_running_continues_from_target() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    clock.play();
    clock.tick(pending(&clock), 0.0, &tl).unwrap();
    clock.tick(pending(&clock), 1000.0, &tl).unwrap();

    clock.seek(3.0, &tl).unwrap();
    assert!(clock.is_running());
    let frame = clock.tick(pending(&clock), 9000.0, &tl).unwrap().unwrap();
    assert_abs_diff_eq!(frame.time, 3.0, epsilon = 1e-9);
    let frame = clock.tick(pending(&clock), 9500.0, &tl).unwrap().unwrap();
    assert_abs_diff_eq!(frame.time, 3.5, epsilon = 1e-9);
}

#[test]
fn long_session_keeps_bounded_state() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    clock.play();
    for i in 0..10_000u32 {
        clock.tick(pending(&clock), f64::from(i) * 16.0, &tl).unwrap();
        if i % 20 == 0 {
            clock.seek(f64::from(i % 5), &tl).unwrap();
        }
    }
    assert_eq!(clock.source().requested_count(), 10_001);
    // only the outstanding request is held by the source
    assert_eq!(clock.source().pending(), clock.pending_tick());
    assert_eq!(clock.queued_events(), MAX_QUEUED_EVENTS);
    assert_eq!(clock.drain_events().len(), MAX_QUEUED_EVENTS);
}

#[test]
fn late_tick_after_stop_publishes_nothing() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    let published: Rc<RefCell<Vec<Frame>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&published);
    clock.subscribe(move |frame| sink.borrow_mut().push(frame.clone()));

    clock.play();
    for ts in [0.0, 100.0, 200.0] {
        clock.tick(pending(&clock), ts, &tl).unwrap();
    }
    // the request made by the third tick is still outstanding
    let late = pending(&clock);
    assert!(clock.pause());
    assert_eq!(clock.source().last_cancelled(), Some(late));
    assert_eq!(clock.source().pending(), None);

    let before = clock.frame().clone();
    assert!(clock.tick(late, 300.0, &tl).unwrap().is_none());
    assert_eq!(clock.frame(), &before);
    assert_eq!(published.borrow().len(), 3);
    assert_eq!(clock.pending_tick(), None);
}

#[test]
fn unknown_handle_is_ignored_while_running() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    clock.play();
    let stray = clock.source_mut().request_tick();
    assert!(clock.tick(stray, 0.0, &tl).unwrap().is_none());
    assert!(clock.is_running());
}

#[test]
fn failing_tick_stops_clock() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    clock.play();
    clock.drain_events();

    let err = clock.tick(pending(&clock), f64::NAN, &tl).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTime { .. }));
    assert_eq!(clock.state(), PlaybackState::Stopped);
    assert_eq!(clock.pending_tick(), None);
    assert!(matches!(
        clock.drain_events().as_slice(),
        [ClockEvent::TickFailed { .. }]
    ));
}

#[test]
fn seek_and_reset_publish_frames() {
    let tl = mk_timeline();
    let mut clock = PlaybackClock::new(ManualTicks::new(), 5.0).unwrap();
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    let id = clock.subscribe(move |_| *sink.borrow_mut() += 1);

    let frame = clock.seek(4.0, &tl).unwrap();
    assert_eq!(frame.shape, *tl.get(4.0).unwrap());
    // the end of the timeline is a valid seek target
    clock.seek(5.0, &tl).unwrap();
    assert_eq!(
        clock.seek(5.5, &tl).unwrap_err(),
        EngineError::TimeOutOfRange {
            time: 5.5,
            duration: 5.0
        }
    );

    clock.reset(&tl);
    assert_eq!(clock.current_time(), 0.0);
    assert_eq!(clock.frame().shape, *tl.get(0.0).unwrap());
    assert_eq!(*count.borrow(), 3);

    assert!(clock.unsubscribe(id));
    assert!(!clock.unsubscribe(id));
    clock.seek(1.0, &tl).unwrap();
    assert_eq!(*count.borrow(), 3);

    assert_eq!(
        clock.drain_events(),
        vec![
            ClockEvent::Seeked { time: 4.0 },
            ClockEvent::Seeked { time: 5.0 },
            ClockEvent::Reset,
            ClockEvent::Seeked { time: 1.0 },
        ]
    );
}

#[test]
fn rejects_non_positive_duration() {
    assert!(PlaybackClock::new(ManualTicks::new(), 0.0).is_err());
    assert!(PlaybackClock::new(ManualTicks::new(), f64::NAN).is_err());
}
