//! Result viewer
//!
//! The destination a finished flow navigates to. It reads the draft back
//! from the store under the shared key and prints it.

use std::io::Write;

use charter_core::{NavigationError, Navigator, ResultSource, RESULT_DESTINATION, RESULT_KEY};
use serde_json::Value;
use tracing::debug;

/// Print a stored draft: pretty JSON when it parses, as-is otherwise
pub fn render_result(out: &mut impl Write, value: &str, raw: bool) -> std::io::Result<()> {
    if raw {
        write!(out, "{value}")?;
        if !value.ends_with('\n') {
            writeln!(out)?;
        }
        return Ok(());
    }

    match serde_json::from_str::<Value>(value) {
        Ok(Value::String(text)) => writeln!(out, "{}", text.trim_end()),
        Ok(json) => {
            let pretty = serde_json::to_string_pretty(&json).unwrap_or_else(|_| value.to_string());
            writeln!(out, "{pretty}")
        }
        Err(_) => writeln!(out, "{}", value.trim_end()),
    }
}

/// Load the draft and render it
pub fn open_viewer(
    source: &dyn ResultSource,
    out: &mut impl Write,
    raw: bool,
) -> Result<(), NavigationError> {
    let value = source
        .load(RESULT_KEY)?
        .ok_or_else(|| NavigationError::Missing(RESULT_KEY.to_string()))?;
    debug!("Rendering stored draft ({} bytes)", value.len());
    render_result(out, &value, raw)?;
    out.flush()?;
    Ok(())
}

/// Navigator that "opens" the viewer in the terminal
pub struct ViewerNavigator<S, W> {
    source: S,
    out: W,
}

impl<S: ResultSource, W: Write> ViewerNavigator<S, W> {
    pub fn new(source: S, out: W) -> Self {
        Self { source, out }
    }
}

impl<S: ResultSource, W: Write> Navigator for ViewerNavigator<S, W> {
    fn navigate(&mut self, destination: &str) -> Result<(), NavigationError> {
        if destination != RESULT_DESTINATION {
            return Err(NavigationError::UnknownDestination(destination.to_string()));
        }
        open_viewer(&self.source, &mut self.out, false)
    }
}
