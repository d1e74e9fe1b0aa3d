//! Gesture-to-event translation
//!
//! Converts a gesture request (one point plus a hold duration, or an ordered
//! path plus a total duration) into the timed primitive events a backend
//! replays against its transport. Written once so timing and ordering are
//! identical no matter which backend executes the plan.

use serde::{Deserialize, Serialize};

/// A point in device pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A primitive touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    Down(Point),
    Move(Point),
    Up,
}

/// A primitive event plus the delay to wait before issuing it.
///
/// `delay_ms` is relative to the previous event; the first event of a
/// gesture always carries zero delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub delay_ms: u64,
    pub event: TouchEvent,
}

impl TimedEvent {
    fn immediate(event: TouchEvent) -> Self {
        Self { delay_ms: 0, event }
    }

    fn after(delay_ms: u64, event: TouchEvent) -> Self {
        Self { delay_ms, event }
    }
}

/// Plan a click: touch down, hold for `duration_ms`, touch up.
pub fn plan_click(point: Point, duration_ms: u64) -> Vec<TimedEvent> {
    vec![
        TimedEvent::immediate(TouchEvent::Down(point)),
        TimedEvent::after(duration_ms, TouchEvent::Up),
    ]
}

/// Plan a swipe along `points`, spreading `duration_ms` evenly across the
/// path's segments (`duration_ms / (N - 1)` per segment).
///
/// An empty path yields no events. A single point degenerates to a
/// stationary hold for the full duration. For paths of two or more points,
/// intermediate positions become `Move` events when the backend has a true
/// move primitive, or repeated `Down` events when it does not; the final
/// `Up` is issued immediately after the last position.
pub fn plan_swipe(points: &[Point], duration_ms: u64, move_capable: bool) -> Vec<TimedEvent> {
    match points {
        [] => Vec::new(),
        [only] => plan_click(*only, duration_ms),
        [first, rest @ ..] => {
            let segment_ms = duration_ms / rest.len() as u64;
            let mut events = Vec::with_capacity(points.len() + 1);
            events.push(TimedEvent::immediate(TouchEvent::Down(*first)));
            for point in rest {
                let contact = if move_capable {
                    TouchEvent::Move(*point)
                } else {
                    TouchEvent::Down(*point)
                };
                events.push(TimedEvent::after(segment_ms, contact));
            }
            events.push(TimedEvent::immediate(TouchEvent::Up));
            events
        }
    }
}
