//! Progress state machine for a drafting flow
//!
//! State lives in [`FlowState`]; rendering goes through [`ProgressView`].

mod controller;
mod phase;
mod view;

pub use controller::{
    FailureReason, Flow, FlowState, ProgressController, RESULT_DESTINATION, RESULT_KEY,
};
pub use phase::{classify, Phase};
pub use view::{Navigator, ProgressView};
