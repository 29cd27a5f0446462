//! Connect to a server and count death links until shutdown

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use deathlink_core::SystemClock;
use reporter::{
    count_signal, shutdown_signal, DebouncedReporter, LogSink, ShutdownListener, ShutdownTrigger,
};
use session::{Credentials, Session, SessionContext};

use crate::console;
use crate::util::ConnectTarget;

/// Settings for one client run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: ConnectTarget,
    pub debounce: Duration,
    pub echo_deaths: bool,
}

pub async fn run(options: RunOptions) -> Result<()> {
    let (signal, counts) = count_signal(0);
    let (trigger, listener) = shutdown_signal();

    let reporter = DebouncedReporter::new(options.debounce, counts, listener.clone(), LogSink).spawn();
    spawn_interrupt_handler(trigger.clone());

    let ctx = SessionContext::new(Arc::new(SystemClock::new()), signal, options.echo_deaths);
    let outcome = run_session(&options, ctx, listener).await;

    // Stop the reporter whatever ended the session, and wait for it
    trigger.trigger();
    reporter.await.context("Death link reporter panicked")?;

    // A burst still pending at shutdown is dropped, not reported
    let total = outcome?;
    debug!(total, "Session ended");
    Ok(())
}

async fn run_session(
    options: &RunOptions,
    ctx: SessionContext,
    mut listener: ShutdownListener,
) -> Result<u64> {
    let address = options.target.address.as_str();
    info!("Connecting to {}", address);

    let ws = tokio::select! {
        ws = session::connect(address) => ws.with_context(|| format!("Failed to connect to {}", address))?,
        _ = listener.wait() => {
            debug!("Shutdown requested while connecting");
            return Ok(ctx.count());
        }
    };

    let console = console::spawn_reader()?;
    let credentials = Credentials {
        name: options.target.name.clone(),
        password: options.target.password.clone(),
    };

    let ctx = Session::new(ws, ctx, credentials)
        .run(console, listener)
        .await
        .context("Session ended with an error")?;
    Ok(ctx.count())
}

fn spawn_interrupt_handler(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            trigger.trigger();
        }
    });
}
