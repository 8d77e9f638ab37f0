use anyhow::anyhow;

/// Waits for a termination request from the OS and returns it as an
/// error named after the signal. This is the intended shutdown path.
///
/// On Unix both SIGINT (Ctrl-C) and SIGTERM (kill default, used by
/// systemd and friends) are handled; elsewhere only Ctrl-C is.
#[cfg(unix)]
pub async fn terminated() -> anyhow::Error {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => return e.into(),
        };

    tokio::select! {
        _ = sigint.recv() => anyhow!("interrupt"),
        _ = sigterm.recv() => anyhow!("terminated"),
    }
}

#[cfg(not(unix))]
pub async fn terminated() -> anyhow::Error {
    match tokio::signal::ctrl_c().await {
        Ok(()) => anyhow!("interrupt"),
        Err(e) => e.into(),
    }
}
