//! End-to-end tests for the deathlink-counter binary

mod common;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use common::cli::CounterCommand;

#[test]
fn test_example_config_prints() -> Result<()> {
    let dir = TempDir::new()?;

    let result = counter!(dir.path(), "config", "--example").assert_success()?;
    assert!(result.contains_stdout("[reporter]"));
    assert!(result.contains_stdout("debounce_secs = 5.0"));
    assert!(result.contains_stdout("default_port = 38281"));
    Ok(())
}

#[test]
fn test_missing_address_fails() -> Result<()> {
    let dir = TempDir::new()?;

    let result = counter!(dir.path(), "--name", "Player1").assert_failure()?;
    assert!(result.contains_stderr("No server address given"));
    Ok(())
}

#[test]
fn test_delay_out_of_range_fails_before_connecting() -> Result<()> {
    let dir = TempDir::new()?;

    let result = counter!(dir.path(), "ws://127.0.0.1:1", "--delay", "0").assert_failure()?;
    assert!(result.contains_stderr("between 0.1 and 3600"));
    assert!(!result.contains_stdout("Connecting to"));
    Ok(())
}

#[test]
fn test_unreachable_server_exits_with_error() -> Result<()> {
    let dir = TempDir::new()?;

    let result = counter!(dir.path(), "ws://127.0.0.1:1").assert_failure()?;
    assert!(result.contains_stdout("Connecting to ws://127.0.0.1:1"));
    assert!(result.contains_stderr("Failed to connect to ws://127.0.0.1:1"));
    assert!(result.duration < Duration::from_secs(30));
    Ok(())
}

#[test]
fn test_bad_log_filter_in_env_falls_back_to_config() -> Result<()> {
    let dir = TempDir::new()?;

    let mut cmd = counter!(dir.path(), "ws://127.0.0.1:1");
    cmd.env("RUST_LOG", "[[[not a filter");
    let result = cmd.assert_failure()?;
    assert!(result.contains_stderr("Failed to connect"));
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_set_then_get() -> Result<()> {
    let dir = TempDir::new()?;

    let result = counter!(dir.path(), "config", "--path").assert_success()?;
    assert!(result.contains_stdout("deathlink-counter"));
    assert!(result.contains_stdout("File does not exist"));

    counter!(dir.path(), "config", "--set", "reporter.debounce_secs", "2.5").assert_success()?;
    assert!(dir.path().join("deathlink-counter/config.toml").exists());

    let result = counter!(dir.path(), "config", "--get", "reporter.debounce_secs").assert_success()?;
    assert_eq!(result.stdout.trim(), "2.5");

    counter!(dir.path(), "config", "--set", "reporter.debounce_secs", "9000").assert_failure()?;
    let result = counter!(dir.path(), "config", "--get", "reporter.debounce_secs").assert_success()?;
    assert_eq!(result.stdout.trim(), "2.5");
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_path_create_writes_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let file = dir.path().join("deathlink-counter/config.toml");

    let result = counter!(dir.path(), "config", "--path", "--create").assert_success()?;
    assert!(result.contains_stdout("Created"));
    assert!(file.exists());

    let result = counter!(dir.path(), "config", "--get", "connection.default_port").assert_success()?;
    assert_eq!(result.stdout.trim(), "38281");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exit_during_pending_burst_reports_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = format!("ws://{}", listener.local_addr()?);
    let (burst_tx, burst_rx) = oneshot::channel();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await?;
        let mut ws = accept_async(tcp).await?;

        let room_info = json!([{ "cmd": "RoomInfo", "password": false, "time": 1000.5 }]);
        ws.send(Message::Text(room_info.to_string())).await?;

        // Wait for the client's Connect
        while let Some(message) = ws.next().await {
            if let Message::Text(text) = message? {
                if text.contains("\"Connect\"") {
                    break;
                }
            }
        }

        let connected = json!([{ "cmd": "Connected", "team": 0, "slot": 1 }]);
        ws.send(Message::Text(connected.to_string())).await?;
        let burst = json!([
            { "cmd": "Bounced", "tags": ["DeathLink"], "data": { "time": 1001.5, "source": "A", "cause": "lava" } },
            { "cmd": "Bounced", "tags": ["DeathLink"], "data": { "time": 1001.75, "source": "B", "cause": "lava" } },
            { "cmd": "Bounced", "tags": ["DeathLink"], "data": { "time": 1002.0, "source": "C", "cause": "lava" } },
        ]);
        ws.send(Message::Text(burst.to_string())).await?;
        let _ = burst_tx.send(());

        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
        anyhow::Ok(())
    });

    let mut running = CounterCommand::new(dir.path())
        .args(&[address.as_str(), "--name", "Watcher", "--delay", "5"])
        .spawn()?;

    tokio::time::timeout(Duration::from_secs(10), burst_rx)
        .await
        .context("server never sent the burst")??;
    // Well inside the 5s window, long enough for the frame to be handled
    tokio::time::sleep(Duration::from_millis(1500)).await;
    running.send_line("/exit")?;

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        tokio::task::spawn_blocking(move || running.wait()),
    )
    .await
    .context("client did not exit")???;

    assert!(result.success(), "stderr: {}", result.stderr);
    assert_eq!(result.stdout.matches("because of \"lava\"").count(), 3);
    assert!(!result.contains_stdout("Death Link count"));
    assert!(result.duration < Duration::from_secs(5));

    tokio::time::timeout(Duration::from_secs(5), server).await???;
    Ok(())
}
