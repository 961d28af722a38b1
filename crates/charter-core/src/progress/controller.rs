//! Progress controller
//!
//! Owns the state of one submission flow. Each decoded record is applied in
//! order; a `result` record performs the hand-off (persist, then navigate) and
//! ends the flow. Everything after a terminal state is ignored.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::client::ChatRequest;
use crate::error::ClientError;
use crate::session::SessionId;
use crate::storage::ResultSink;
use crate::stream::EventRecord;

use super::phase::{classify, Phase};
use super::view::{Navigator, ProgressView};

/// Storage key the result viewer reads from
pub const RESULT_KEY: &str = "currentConstitution";

/// Where the client goes once the result is stored
pub const RESULT_DESTINATION: &str = "/constitution.html";

/// Why a flow ended in [`FlowState::Failed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Request failed, non-success status, or the body read failed
    Connection,
    /// Body ended without a `result` record
    StreamEnded,
    /// Result could not be written to the sink
    Persist,
    /// Result was stored but the viewer could not be reached
    Navigation,
}

impl FailureReason {
    /// Fixed status text shown to the user
    pub fn message(self) -> &'static str {
        match self {
            FailureReason::Connection => "Connection error. Please try again.",
            FailureReason::StreamEnded => {
                "The drafting service ended the stream without a result."
            }
            FailureReason::Persist => "Could not save the drafted constitution.",
            FailureReason::Navigation => "Could not open the constitution viewer.",
        }
    }
}

/// State of one submission flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Form visible, nothing sent
    Idle,
    /// Request in flight, no progress seen yet
    Submitting,
    /// Progress seen; `phase` is `None` when the last status matched no step
    Running { phase: Option<Phase> },
    /// Result persisted and viewer reached
    Completed,
    Failed(FailureReason),
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Completed | FlowState::Failed(_))
    }

    /// Phase indicator currently active, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            FlowState::Running { phase } => *phase,
            _ => None,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Idle => f.write_str("idle"),
            FlowState::Submitting => f.write_str("submitting"),
            FlowState::Running { phase: Some(phase) } => write!(f, "{phase}"),
            FlowState::Running { phase: None } => f.write_str("running"),
            FlowState::Completed => f.write_str("completed"),
            FlowState::Failed(reason) => write!(f, "failed ({reason:?})"),
        }
    }
}

/// Whether the caller should keep feeding records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
}

/// Drives the UI from stream records and performs the terminal hand-off
pub struct ProgressController {
    session_id: SessionId,
    state: FlowState,
    sink: Box<dyn ResultSink + Send>,
    navigator: Box<dyn Navigator + Send>,
    view: Box<dyn ProgressView + Send>,
}

impl ProgressController {
    pub fn new(
        session_id: SessionId,
        sink: Box<dyn ResultSink + Send>,
        navigator: Box<dyn Navigator + Send>,
        view: Box<dyn ProgressView + Send>,
    ) -> Self {
        Self {
            session_id,
            state: FlowState::Idle,
            sink,
            navigator,
            view,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Start a flow for `topic`
    ///
    /// Returns the request to send, or `None` when the topic is blank or a
    /// flow was already started. Nothing changes in either case.
    pub fn on_submit(&mut self, topic: &str) -> Option<ChatRequest> {
        let topic = topic.trim();
        if topic.is_empty() {
            debug!("Ignoring submit with empty topic");
            return None;
        }
        if self.state != FlowState::Idle {
            warn!("Ignoring submit while flow is {}", self.state);
            return None;
        }

        info!(session_id = %self.session_id, "Submitting topic: {}", topic);
        self.view.show_progress();
        self.transition(FlowState::Submitting);
        Some(ChatRequest::for_topic(topic, self.session_id.clone()))
    }

    /// Apply one record from the stream
    pub fn on_event(&mut self, record: EventRecord) -> Flow {
        match self.state {
            FlowState::Idle => {
                warn!("Ignoring {:?} record before submit", record.kind());
                return Flow::Continue;
            }
            FlowState::Completed | FlowState::Failed(_) => {
                debug!("Ignoring {:?} record after flow ended", record.kind());
                return Flow::Finished;
            }
            FlowState::Submitting | FlowState::Running { .. } => {}
        }

        match record {
            EventRecord::Progress { text } => {
                self.view.set_status(&text);
                let phase = classify(&text);
                self.view.set_phase(phase);
                self.transition(FlowState::Running { phase });
                Flow::Continue
            }
            EventRecord::Result { text } => {
                self.hand_off(&text);
                Flow::Finished
            }
        }
    }

    /// Request failed or the body could not be read
    pub fn on_transport_error(&mut self, err: &ClientError) {
        if self.state.is_terminal() {
            debug!("Transport error after flow ended: {}", err);
            return;
        }
        error!("Drafting request failed: {}", err);
        self.fail(FailureReason::Connection);
    }

    /// Body ended; fails the flow if no result arrived
    pub fn on_stream_end(&mut self) {
        match self.state {
            FlowState::Submitting | FlowState::Running { .. } => {
                warn!("Stream ended in state {} without a result", self.state);
                self.fail(FailureReason::StreamEnded);
            }
            FlowState::Idle | FlowState::Completed | FlowState::Failed(_) => {}
        }
    }

    fn hand_off(&mut self, payload: &str) {
        info!("Result received ({} bytes), storing under {}", payload.len(), RESULT_KEY);
        self.view.hand_off_started();
        if let Err(e) = self.sink.store(RESULT_KEY, payload) {
            error!("Failed to persist result: {}", e);
            self.fail(FailureReason::Persist);
            return;
        }

        if let Err(e) = self.navigator.navigate(RESULT_DESTINATION) {
            error!("Failed to navigate to {}: {}", RESULT_DESTINATION, e);
            self.fail(FailureReason::Navigation);
            return;
        }

        self.transition(FlowState::Completed);
    }

    fn fail(&mut self, reason: FailureReason) {
        self.view.set_status(reason.message());
        self.transition(FlowState::Failed(reason));
    }

    fn transition(&mut self, next: FlowState) {
        if self.state == next {
            return;
        }
        debug!("Flow state: {} -> {}", self.state, next);
        self.state = next;
        self.view.state_changed(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::{NavigationError, StorageError};
    use crate::storage::MemoryStore;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        ShowProgress,
        Status(String),
        Phase(Option<Phase>),
        State(FlowState),
        HandOff,
        Navigate(String),
    }

    type Log = Arc<Mutex<Vec<Call>>>;

    struct RecordingView(Log);

    impl ProgressView for RecordingView {
        fn show_progress(&mut self) {
            self.0.lock().push(Call::ShowProgress);
        }
        fn set_status(&mut self, text: &str) {
            self.0.lock().push(Call::Status(text.to_string()));
        }
        fn set_phase(&mut self, phase: Option<Phase>) {
            self.0.lock().push(Call::Phase(phase));
        }
        fn hand_off_started(&mut self) {
            self.0.lock().push(Call::HandOff);
        }
        fn state_changed(&mut self, state: &FlowState) {
            self.0.lock().push(Call::State(state.clone()));
        }
    }

    struct RecordingNavigator {
        log: Log,
        fail: bool,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, destination: &str) -> Result<(), NavigationError> {
            self.log.lock().push(Call::Navigate(destination.to_string()));
            if self.fail {
                return Err(NavigationError::UnknownDestination(destination.to_string()));
            }
            Ok(())
        }
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn store(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    fn controller_with(
        sink: Box<dyn ResultSink + Send>,
        fail_navigation: bool,
    ) -> (ProgressController, Log) {
        let log: Log = Arc::default();
        let controller = ProgressController::new(
            SessionId::from("session-test"),
            sink,
            Box::new(RecordingNavigator {
                log: log.clone(),
                fail: fail_navigation,
            }),
            Box::new(RecordingView(log.clone())),
        );
        (controller, log)
    }

    fn controller() -> (ProgressController, Log, MemoryStore) {
        let store = MemoryStore::new();
        let (controller, log) = controller_with(Box::new(store.clone()), false);
        (controller, log, store)
    }

    fn states(log: &Log) -> Vec<FlowState> {
        log.lock()
            .iter()
            .filter_map(|c| match c {
                Call::State(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_blank_topic_is_rejected_without_side_effects() {
        let (mut controller, log, _) = controller();

        assert!(controller.on_submit("").is_none());
        assert!(controller.on_submit("   ").is_none());
        assert!(controller.on_submit("\t\n").is_none());

        assert_eq!(controller.state(), &FlowState::Idle);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_submit_builds_request_and_shows_progress() {
        let (mut controller, log, _) = controller();

        let request = controller.on_submit("  pediatric telehealth ").unwrap();
        assert_eq!(
            request.message,
            "Draft a binding AI Constitution for this use case: pediatric telehealth"
        );
        assert_eq!(request.session_id.as_str(), "session-test");
        assert_eq!(controller.state(), &FlowState::Submitting);
        assert_eq!(
            *log.lock(),
            vec![Call::ShowProgress, Call::State(FlowState::Submitting)]
        );
    }

    #[test]
    fn test_second_submit_is_ignored() {
        let (mut controller, _, _) = controller();
        assert!(controller.on_submit("first").is_some());
        assert!(controller.on_submit("second").is_none());
        assert_eq!(controller.state(), &FlowState::Submitting);
    }

    #[test]
    fn test_progress_updates_status_then_phase() {
        let (mut controller, log, _) = controller();
        controller.on_submit("topic");
        log.lock().clear();

        let flow = controller.on_event(EventRecord::progress("research and judge"));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(controller.state().phase(), Some(Phase::Researching));
        assert_eq!(
            *log.lock(),
            vec![
                Call::Status("research and judge".to_string()),
                Call::Phase(Some(Phase::Researching)),
                Call::State(FlowState::Running {
                    phase: Some(Phase::Researching)
                }),
            ]
        );
    }

    #[test]
    fn test_unmatched_progress_clears_phase_but_updates_status() {
        let (mut controller, log, _) = controller();
        controller.on_submit("topic");
        controller.on_event(EventRecord::progress("Judge is evaluating"));
        log.lock().clear();

        controller.on_event(EventRecord::progress("Thinking..."));

        assert_eq!(controller.state(), &FlowState::Running { phase: None });
        assert_eq!(
            *log.lock(),
            vec![
                Call::Status("Thinking...".to_string()),
                Call::Phase(None),
                Call::State(FlowState::Running { phase: None }),
            ]
        );
    }

    #[test]
    fn test_repeated_phase_reapplies_indicator_without_state_change() {
        let (mut controller, log, _) = controller();
        controller.on_submit("topic");
        controller.on_event(EventRecord::progress("Researcher is gathering"));
        log.lock().clear();

        controller.on_event(EventRecord::progress("Still researching"));

        assert_eq!(
            *log.lock(),
            vec![
                Call::Status("Still researching".to_string()),
                Call::Phase(Some(Phase::Researching)),
            ]
        );
    }

    #[test]
    fn test_result_persists_verbatim_then_navigates_once() {
        let (mut controller, log, store) = controller();
        controller.on_submit("pediatric telehealth");
        controller.on_event(EventRecord::progress("Researching sources"));
        controller.on_event(EventRecord::progress("Builder drafting"));

        let flow = controller.on_event(EventRecord::result(r#"{"title":"..."}"#));
        assert_eq!(flow, Flow::Finished);
        assert_eq!(
            store.get(RESULT_KEY).as_deref(),
            Some(r#"{"title":"..."}"#)
        );

        // Anything after the result is ignored
        assert_eq!(
            controller.on_event(EventRecord::progress("Judge again")),
            Flow::Finished
        );
        assert_eq!(
            controller.on_event(EventRecord::result("second")),
            Flow::Finished
        );
        assert_eq!(store.get(RESULT_KEY).as_deref(), Some(r#"{"title":"..."}"#));

        let navigations: Vec<_> = log
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Navigate(_)))
            .cloned()
            .collect();
        assert_eq!(navigations, vec![Call::Navigate(RESULT_DESTINATION.to_string())]);

        assert_eq!(
            states(&log),
            vec![
                FlowState::Submitting,
                FlowState::Running {
                    phase: Some(Phase::Researching)
                },
                FlowState::Running {
                    phase: Some(Phase::Building)
                },
                FlowState::Completed,
            ]
        );
    }

    #[test]
    fn test_view_is_told_before_navigator_writes() {
        let (mut controller, log, _) = controller();
        controller.on_submit("topic");
        controller.on_event(EventRecord::progress("Builder drafting"));
        log.lock().clear();

        controller.on_event(EventRecord::result("{}"));

        assert_eq!(
            *log.lock(),
            vec![
                Call::HandOff,
                Call::Navigate(RESULT_DESTINATION.to_string()),
                Call::State(FlowState::Completed),
            ]
        );
    }

    #[test]
    fn test_result_without_progress_completes() {
        let (mut controller, _, store) = controller();
        controller.on_submit("topic");
        assert_eq!(controller.on_event(EventRecord::result("raw")), Flow::Finished);
        assert_eq!(controller.state(), &FlowState::Completed);
        assert_eq!(store.get(RESULT_KEY).as_deref(), Some("raw"));
    }

    #[test]
    fn test_transport_error_shows_connection_message() {
        let (mut controller, log, store) = controller();
        controller.on_submit("topic");

        controller.on_transport_error(&ClientError::Status {
            status: 500,
            body: "boom".to_string(),
        });

        assert_eq!(
            controller.state(),
            &FlowState::Failed(FailureReason::Connection)
        );
        assert!(log
            .lock()
            .contains(&Call::Status("Connection error. Please try again.".to_string())));
        assert!(!log.lock().iter().any(|c| matches!(c, Call::Navigate(_))));
        assert!(store.is_empty());

        // Terminal: later records are ignored
        assert_eq!(
            controller.on_event(EventRecord::result("late")),
            Flow::Finished
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_stream_end_without_result_fails() {
        let (mut controller, log, _) = controller();
        controller.on_submit("topic");
        controller.on_event(EventRecord::progress("Builder drafting"));

        controller.on_stream_end();

        assert_eq!(
            controller.state(),
            &FlowState::Failed(FailureReason::StreamEnded)
        );
        assert!(log
            .lock()
            .contains(&Call::Status(FailureReason::StreamEnded.message().to_string())));
    }

    #[test]
    fn test_stream_end_after_completion_is_noop() {
        let (mut controller, _, _) = controller();
        controller.on_submit("topic");
        controller.on_event(EventRecord::result("done"));
        controller.on_stream_end();
        assert_eq!(controller.state(), &FlowState::Completed);
    }

    #[test]
    fn test_persist_failure_skips_navigation() {
        let (mut controller, log) = controller_with(Box::new(FailingSink), false);
        controller.on_submit("topic");

        assert_eq!(controller.on_event(EventRecord::result("x")), Flow::Finished);
        assert_eq!(controller.state(), &FlowState::Failed(FailureReason::Persist));
        assert!(!log.lock().iter().any(|c| matches!(c, Call::Navigate(_))));
    }

    #[test]
    fn test_navigation_failure_fails_flow() {
        let store = MemoryStore::new();
        let (mut controller, _) = controller_with(Box::new(store.clone()), true);
        controller.on_submit("topic");

        controller.on_event(EventRecord::result("x"));

        assert_eq!(
            controller.state(),
            &FlowState::Failed(FailureReason::Navigation)
        );
        assert_eq!(store.get(RESULT_KEY).as_deref(), Some("x"));
    }
}
