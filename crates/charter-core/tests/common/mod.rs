//! Shared harness: a one-shot HTTP server and recording collaborators

#![allow(dead_code)]

use std::io::Read;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use charter_core::{FlowState, NavigationError, Navigator, Phase, ProgressView};
use parking_lot::Mutex;

/// What the mock server saw
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

pub struct MockServer {
    pub base_url: String,
    requests: mpsc::Receiver<CapturedRequest>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Wait for the single request the server handles
    pub fn captured(self) -> CapturedRequest {
        let request = self
            .requests
            .recv_timeout(Duration::from_secs(5))
            .expect("mock server received no request");
        self.handle.join().expect("mock server thread panicked");
        request
    }
}

/// Reader that hands out at most `step` bytes per read, pausing in between
struct TrickleReader {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        std::thread::sleep(Duration::from_millis(2));
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Serve exactly one request, answering with `status` and `body`
///
/// The body is sent chunked, `step` bytes at a time.
pub fn serve_once(status: u16, content_type: &'static str, body: String, step: usize) -> MockServer {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind mock server");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("mock server has an IP address");
    let (tx, rx) = mpsc::channel();

    let handle = std::thread::spawn(move || {
        let Ok(mut request) = server.recv() else {
            return;
        };

        let mut request_body = String::new();
        let _ = request.as_reader().read_to_string(&mut request_body);
        let content_type_in = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_string());
        let _ = tx.send(CapturedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            content_type: content_type_in,
            body: request_body,
        });

        let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
            .expect("valid header");
        let response = tiny_http::Response::new(
            tiny_http::StatusCode(status),
            vec![header],
            TrickleReader {
                data: body.into_bytes(),
                pos: 0,
                step: step.max(1),
            },
            None,
            None,
        );
        let _ = request.respond(response);
    });

    MockServer {
        base_url: format!("http://{addr}"),
        requests: rx,
        handle,
    }
}

/// A base URL nothing listens on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    ShowProgress,
    Status(String),
    Phase(Option<Phase>),
    State(FlowState),
}

pub type UiLog = Arc<Mutex<Vec<UiCall>>>;

pub struct RecordingView(pub UiLog);

impl ProgressView for RecordingView {
    fn show_progress(&mut self) {
        self.0.lock().push(UiCall::ShowProgress);
    }
    fn set_status(&mut self, text: &str) {
        self.0.lock().push(UiCall::Status(text.to_string()));
    }
    fn set_phase(&mut self, phase: Option<Phase>) {
        self.0.lock().push(UiCall::Phase(phase));
    }
    fn state_changed(&mut self, state: &FlowState) {
        self.0.lock().push(UiCall::State(state.clone()));
    }
}

pub struct RecordingNavigator(pub Arc<Mutex<Vec<String>>>);

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, destination: &str) -> Result<(), NavigationError> {
        self.0.lock().push(destination.to_string());
        Ok(())
    }
}

pub fn states(log: &UiLog) -> Vec<FlowState> {
    log.lock()
        .iter()
        .filter_map(|call| match call {
            UiCall::State(state) => Some(state.clone()),
            _ => None,
        })
        .collect()
}

pub fn last_status(log: &UiLog) -> Option<String> {
    log.lock().iter().rev().find_map(|call| match call {
        UiCall::Status(text) => Some(text.clone()),
        _ => None,
    })
}
