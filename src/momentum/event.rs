use crate::time::{tick, Tick, TickKey};
use crate::Id;

/// The three kinds of capacity-change point on a specialty's timeline.
///
/// Rank governs tie-breaking at equal time: `Initial` always sorts first,
/// and `End` sorts before `Start` so a task ending at `t` frees capacity
/// before another task claims it at the same `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Initial,
    End,
    Start,
}

impl EventKind {
    pub(crate) fn rank(self) -> u8 {
        match self {
            EventKind::Initial => 0,
            EventKind::End => 1,
            EventKind::Start => 2,
        }
    }
}

/// A single point on a (contractor, specialty) capacity timeline: the
/// available headcount once this event applies.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub time: Tick,
    pub available: u32,
    /// Shared by a START/END pair produced by the same commit; `None` for
    /// the seeded `Initial` event.
    pub task_seq: Option<i64>,
    pub work_id: Option<Id>,
}

/// The composite total order key: `(time, kind rank, sequence id)`. Kind
/// dominates sequence id so that `End` always precedes `Start` at equal
/// time regardless of which task's sequence number is larger — this is
/// what makes "a task ending at t frees capacity for a task starting at
/// t" hold for any two tasks, not just same-task pairs.
pub(crate) type EventKey = (TickKey, u8, i64);

pub(crate) fn key_for(time: Tick, kind: EventKind, seq: i64) -> EventKey {
    (
        TickKey::new(time).expect("event time must not be NaN"),
        kind.rank(),
        seq,
    )
}

/// Upper bound covering every event at or before `time`, regardless of
/// kind or sequence id (used to read "available as of this instant").
pub(crate) fn at_or_before_bound(time: Tick) -> EventKey {
    (
        TickKey::new(time).expect("event time must not be NaN"),
        u8::MAX,
        i64::MAX,
    )
}

/// Lower bound covering every event exactly at `time`, regardless of kind
/// or sequence id (used as the inclusive start of a `[start, end)` range).
pub(crate) fn at_or_after_bound(time: Tick) -> EventKey {
    (TickKey::new(time).expect("event time must not be NaN"), 0, i64::MIN)
}

pub(crate) fn one_tick_after(time: Tick) -> Tick {
    time + tick(1)
}
