//! Console commands
//!
//! Lines starting with `/` are commands. Anything else is ignored, since this
//! client never chats.

use crate::context::SessionContext;

/// Result of processing one console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleOutcome {
    /// Lines to show the user
    Output(Vec<String>),
    /// The user asked to quit
    Exit,
}

const HELP: &[(&str, &str)] = &[
    ("/death_link_count", "Show the number of death links received"),
    ("/client_data", "Show client data, for debugging"),
    ("/help", "List commands"),
    ("/exit", "Close the connection and quit"),
];

/// Process one line of console input against the session
pub fn process_line(line: &str, ctx: &SessionContext) -> ConsoleOutcome {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleOutcome::Output(Vec::new());
    }

    let Some(command) = line.strip_prefix('/') else {
        return ConsoleOutcome::Output(vec![
            "This client does not send chat messages; type /help for commands".to_string(),
        ]);
    };
    let name = command.split_whitespace().next().unwrap_or_default();

    match name {
        "death_link_count" => ConsoleOutcome::Output(vec![format!("Death Link count: {}", ctx.count())]),
        "client_data" => ConsoleOutcome::Output(
            ctx.client_data()
                .into_iter()
                .map(|(field, value)| format!("obj.{} = {}", field, value))
                .collect(),
        ),
        "help" => ConsoleOutcome::Output(
            HELP.iter()
                .map(|(cmd, desc)| format!("{:<20} {}", cmd, desc))
                .collect(),
        ),
        "exit" => ConsoleOutcome::Exit,
        other => ConsoleOutcome::Output(vec![format!(
            "Unknown command: /{}. Type /help for a list of commands.",
            other
        )]),
    }
}
