//! Step-scoped event bus.
//!
//! A solver opens a step with [`EventBus::begin_step`], records events
//! against it and closes it with [`EventBus::end_step`], which hands the
//! step's events to every sink in recording order. Events recorded outside
//! a step carry the number of the last step opened.

use crate::events::{EventKind, SimulationEvent};
use crate::sinks::EventSink;

/// Per-step counters returned by [`EventBus::end_step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepTally {
    pub step: u64,
    /// Events delivered for this step.
    pub events: usize,
}

/// Collects solver events and fans them out to sinks.
#[derive(Default)]
pub struct EventBus {
    pending: Vec<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    disabled: bool,
    step: u64,
    open: bool,
    delivered: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
        if self.disabled {
            self.pending.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Opens step `step`. Anything still queued from an unclosed step is
    /// delivered first.
    pub fn begin_step(&mut self, step: u64) {
        if self.open {
            self.flush();
        }
        self.step = step;
        self.open = true;
    }

    /// Step number new events are stamped with.
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Records an event for the current step. Dropped when disabled.
    pub fn record(&mut self, kind: EventKind) {
        let event = SimulationEvent::new(self.step, kind);
        self.emit(event);
    }

    /// Queues an already stamped event. Dropped when disabled.
    pub fn emit(&mut self, event: SimulationEvent) {
        if !self.disabled {
            self.pending.push(event);
        }
    }

    /// Closes the current step and delivers its events.
    pub fn end_step(&mut self) -> StepTally {
        let events = self.flush();
        self.open = false;
        StepTally {
            step: self.step,
            events,
        }
    }

    /// Delivers everything queued, in recording order. Returns the number
    /// of events delivered.
    pub fn flush(&mut self) -> usize {
        let batch = std::mem::take(&mut self.pending);
        for event in &batch {
            for sink in &mut self.sinks {
                sink.handle(event);
            }
        }
        self.delivered += batch.len();
        batch.len()
    }

    /// Events queued but not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Events delivered since the bus was created.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Closes any open step and lets every sink finish.
    pub fn finalize(&mut self) {
        if self.open {
            self.end_step();
        } else {
            self.flush();
        }
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }
}
