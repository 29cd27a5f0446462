//! Console input
//!
//! Stdin is read on a dedicated OS thread. A blocking read inside the async
//! runtime would keep the runtime from shutting down until the user pressed
//! enter.

use anyhow::{Context, Result};
use std::io::BufRead;
use tokio::sync::mpsc;

/// Start reading stdin lines into a channel
pub fn spawn_reader() -> Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(32);

    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || pump(std::io::stdin().lock(), tx))
        .context("Failed to spawn console reader thread")?;

    Ok(rx)
}

/// Forward lines until EOF, a read error, or the receiver going away
fn pump<R: BufRead>(reader: R, tx: mpsc::Sender<String>) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        if tx.blocking_send(line).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pump_forwards_lines_then_closes() {
        let (tx, mut rx) = mpsc::channel(4);
        let input = Cursor::new("/death_link_count\nhello\n\n/exit\n");

        let reader = std::thread::spawn(move || pump(input, tx));

        let mut lines = Vec::new();
        while let Some(line) = rx.blocking_recv() {
            lines.push(line);
        }
        reader.join().unwrap();

        assert_eq!(lines, vec!["/death_link_count", "hello", "", "/exit"]);
    }

    #[test]
    fn test_pump_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let input = Cursor::new("a\nb\nc\n");
        std::thread::spawn(move || pump(input, tx)).join().unwrap();
    }
}
