//! Transcript line formatting

use crate::INDENT;
use crate::events::BuildEvent;

/// Format one transcript line (without terminator)
///
/// Layout: indent × depth, `category`, `" > "`, title, message. The title is
/// `prefix` alone for events the host raised itself, otherwise
/// `"<sender>: <prefix>"`. Negative depths indent nothing.
pub fn format_line(prefix: &str, event: &BuildEvent, category: &str, depth: i32, host_sender: &str) -> String {
    let sender = event.sender_name();
    let message = event.message();
    let levels = depth.max(0) as usize;

    let mut line = String::with_capacity(levels * INDENT.len() + category.len() + sender.len() + prefix.len() + message.len() + 5);
    for _ in 0..levels {
        line.push_str(INDENT);
    }
    line.push_str(category);
    line.push_str(" > ");
    if !sender.eq_ignore_ascii_case(host_sender) {
        line.push_str(sender);
        line.push_str(": ");
    }
    line.push_str(prefix);
    line.push_str(message);
    line
}

/// Prefix for a diagnostic: `": <label> <file>(<line>,<column>): "`
pub fn location_prefix(label: &str, file: &str, line: u32, column: u32) -> String {
    format!(": {} {}({},{}): ", label, file, line, column)
}

/// Prefix the event is formatted with; empty for everything but diagnostics
pub(crate) fn event_prefix(event: &BuildEvent) -> String {
    match event {
        BuildEvent::ErrorRaised { file, line, column, .. } => location_prefix("Error", file, *line, *column),
        BuildEvent::WarningRaised { file, line, column, .. } => location_prefix("Warning", file, *line, *column),
        _ => String::new(),
    }
}
