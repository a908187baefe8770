/// Notification for the render loop; `Update` means the camera changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    BeginInteraction,
    Update,
    EndInteraction,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControlEventRecord {
    /// Timestamp of the input or update that caused the event (seconds).
    pub time_s: f64,
    pub event: ControlEvent,
}

/// Queue the controls push into and the render loop drains once per frame.
#[derive(Debug, Clone, Default)]
pub struct ControlEvents {
    events: Vec<ControlEventRecord>,
}

impl ControlEvents {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, time_s: f64, event: ControlEvent) {
        self.events.push(ControlEventRecord { time_s, event });
    }

    pub fn events(&self) -> &[ControlEventRecord] {
        &self.events
    }

    pub fn kinds(&self) -> Vec<ControlEvent> {
        self.events.iter().map(|r| r.event).collect()
    }

    pub fn drain(&mut self) -> Vec<ControlEventRecord> {
        std::mem::take(&mut self.events)
    }
}
