use std::fmt;

/// Printer state as reported by OctoPrint's `state.text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterStatus {
    Operational,
    Printing,
    Disconnected,
    Unknown(String),
}

impl PrinterStatus {
    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            "Operational" => PrinterStatus::Operational,
            "Printing" => PrinterStatus::Printing,
            "Disconnected" => PrinterStatus::Disconnected,
            other => PrinterStatus::Unknown(other.to_string()),
        }
    }
}

/// A recognised state that can be shown on the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseState {
    Operational,
    Printing,
    Disconnected,
}

impl BaseState {
    pub fn is_connected(self) -> bool {
        !matches!(self, BaseState::Disconnected)
    }
}

impl fmt::Display for BaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseState::Operational => write!(f, "Operational"),
            BaseState::Printing => write!(f, "Printing"),
            BaseState::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// What the strip currently shows. Starts as `Unset` on every process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Unset,
    Rendered(BaseState),
}

impl DisplayState {
    pub fn connectivity(self) -> Option<bool> {
        match self {
            DisplayState::Unset => None,
            DisplayState::Rendered(state) => Some(state.is_connected()),
        }
    }
}

/// The outcome of one tick's queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The connectivity probe failed.
    Unreachable,
    Reported(PrinterStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    ToOperational,
    ToDisconnected,
}

/// Position of the relay line; mirrors printer connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPosition {
    /// `out`, printer connected.
    Active,
    /// `in`, printer disconnected.
    Inactive,
}

/// Side effects to run for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub fade: Option<Fade>,
    pub relay: Option<RelayPosition>,
    pub render_progress: bool,
}

impl Edges {
    pub fn none() -> Self {
        Self::default()
    }
}
