//! Terminal progress display
//!
//! One status line with the three pipeline steps in front of it. On a
//! terminal the line is redrawn in place; otherwise each update is its own
//! line.

use std::io::Write;

use charter_core::{FlowState, Phase, ProgressView};
use crossterm::cursor::MoveToColumn;
use crossterm::style::{style, Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

/// Label the submit control switches to while a flow runs
const BUSY_LABEL: &str = "Drafting...";

pub struct TerminalView<W: Write> {
    out: W,
    /// Redraw in place and use colour
    interactive: bool,
    status: String,
    phase: Option<Phase>,
    /// A line is on screen without its trailing newline
    line_open: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, interactive: bool) -> Self {
        Self {
            out,
            interactive,
            status: String::new(),
            phase: None,
            line_open: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn steps(&self) -> String {
        Phase::ALL
            .iter()
            .map(|&step| {
                let label = step.step_label();
                match (self.phase == Some(step), self.interactive) {
                    (true, true) => format!("[{}]", style(label).bold().green()),
                    (true, false) => format!("[{label}]"),
                    (false, true) => format!(" {} ", style(label).dark_grey()),
                    (false, false) => format!(" {label} "),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render(&mut self) {
        let line = format!("{}  {}", self.steps(), self.status);
        if self.interactive {
            let _ = queue!(
                self.out,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(line)
            );
            self.line_open = true;
        } else {
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }

    fn close_line(&mut self) {
        if self.line_open {
            let _ = writeln!(self.out);
            self.line_open = false;
        }
    }
}

impl<W: Write> ProgressView for TerminalView<W> {
    fn show_progress(&mut self) {
        let _ = writeln!(self.out, "{BUSY_LABEL}");
        let _ = self.out.flush();
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn set_phase(&mut self, phase: Option<Phase>) {
        self.phase = phase;
        self.render();
    }

    fn hand_off_started(&mut self) {
        self.close_line();
        let _ = self.out.flush();
    }

    fn state_changed(&mut self, state: &FlowState) {
        match state {
            FlowState::Failed(_) => {
                self.phase = None;
                self.close_line();
                let message = if self.interactive {
                    format!("{}", style(self.status.as_str()).red())
                } else {
                    self.status.clone()
                };
                let _ = writeln!(self.out, "{message}");
                let _ = self.out.flush();
            }
            FlowState::Completed => self.close_line(),
            FlowState::Idle | FlowState::Submitting | FlowState::Running { .. } => {}
        }
    }
}
