//! Engine events consumed by the presentation layer
//!
//! The engine pushes events as it mutates the grid; frontends drain them once
//! per frame with [`EventLog::drain`]. The log is bounded so a headless caller
//! that never drains cannot grow it without limit.

use std::collections::VecDeque;

use serde::Serialize;

use crate::types::{Coord, Direction, Mode, SpecialKind};

/// Oldest events are dropped past this many.
pub const EVENT_LOG_CAPACITY: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// One resolve step removed tiles and awarded points.
    TilesCleared {
        coords: Vec<Coord>,
        points: u32,
        multiplier: u32,
        special_triggered: bool,
    },
    /// Fresh tiles dropped into these cells during compaction.
    TilesSpawned { coords: Vec<Coord> },
    /// A cascade step finished; `step` counts from 1 within one cascade.
    CascadeStep { step: u32 },
    /// A swap produced no match and was undone.
    SwapReverted { a: Coord, b: Coord },
    /// A row or column shifted one step.
    Slid { at: Coord, direction: Direction },
    /// A tile became a special.
    BombArmed { at: Coord, kind: SpecialKind },
    /// A special went off, by fuse or by being cleared.
    Detonated { at: Coord, kind: SpecialKind },
    MultiplierChanged { multiplier: u32 },
    /// Whole seconds left in a timed game.
    TimerTick { remaining_secs: u32 },
    GameEnded { mode: Mode, score: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: VecDeque<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(64),
        }
    }

    pub fn push(&mut self, event: EngineEvent) {
        if self.events.len() == EVENT_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
