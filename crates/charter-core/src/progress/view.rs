//! Seams between the controller and its side effects

use crate::error::NavigationError;

use super::controller::FlowState;
use super::phase::Phase;

/// Rendering surface for one submission flow
pub trait ProgressView {
    /// Hide the input form and show the progress display
    ///
    /// Disables the topic input and the submit control and switches the submit
    /// label to its busy text.
    fn show_progress(&mut self);

    /// Replace the visible status text verbatim
    fn set_status(&mut self, text: &str);

    /// Clear every phase indicator, then mark `phase` active (if any)
    fn set_phase(&mut self, phase: Option<Phase>);

    /// A result arrived; the navigator is about to take over the output
    fn hand_off_started(&mut self) {}

    /// Called after every actual state change
    fn state_changed(&mut self, _state: &FlowState) {}
}

/// Moves the client to another destination once the result is stored
pub trait Navigator {
    fn navigate(&mut self, destination: &str) -> Result<(), NavigationError>;
}
