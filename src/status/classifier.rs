use super::models::*;

/// Advances the display state by one observation.
///
/// Fades and relay switches are edge-triggered: they fire only when the
/// recognised state differs from what is already shown. Progress rendering
/// is level-triggered and fires on every `Printing` observation.
/// Unrecognised status texts leave the display untouched.
pub fn transition(previous: DisplayState, observation: &Observation) -> (DisplayState, Edges) {
    let next = match observation {
        Observation::Unreachable => BaseState::Disconnected,
        Observation::Reported(PrinterStatus::Operational) => BaseState::Operational,
        Observation::Reported(PrinterStatus::Printing) => BaseState::Printing,
        Observation::Reported(PrinterStatus::Disconnected) => BaseState::Disconnected,
        Observation::Reported(PrinterStatus::Unknown(_)) => return (previous, Edges::none()),
    };

    let changed = previous != DisplayState::Rendered(next);
    let fade = match next {
        BaseState::Operational if changed => Some(Fade::ToOperational),
        BaseState::Disconnected if changed => Some(Fade::ToDisconnected),
        _ => None,
    };

    let relay = if previous.connectivity() != Some(next.is_connected()) {
        Some(if next.is_connected() { RelayPosition::Active } else { RelayPosition::Inactive })
    } else {
        None
    };

    let edges = Edges { fade, relay, render_progress: next == BaseState::Printing };
    (DisplayState::Rendered(next), edges)
}
