mod heartbeat;
mod signal;

use std::{process, time::Duration};

use anyhow::Result;
use beacon_multicast::Receiver;
use clap::Parser;
use tokio::sync::mpsc;

#[derive(Parser, Clone, Debug)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Configure {
    /// Multicast group address shared by the listener and the announcer
    #[arg(long, default_value = "224.0.0.1:1234")]
    pub addr: String,
    /// Max datagram size in bytes
    #[arg(long, default_value_t = 8192)]
    pub maxsz: usize,
    /// Send heartbeat interval, e.g. "5s" or "500ms"
    #[arg(long, default_value = "5s", value_parser = parse_interval)]
    pub heartbeat: Duration,
    /// Heartbeat identity, the local hostname by default
    #[arg(long)]
    pub identity: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    simple_logger::init_with_level(log::Level::Info)?;

    let config = Configure::parse();
    log::info!("configure: {:?}", config);

    let identity = match config.identity.clone() {
        Some(identity) => identity,
        None => hostname::get()?.to_string_lossy().into_owned(),
    };

    // One slot per loop so no reporter ever blocks; the first value
    // received wins and the process exits, reclaiming the two loops
    // still running.
    let (tx, mut rx) = mpsc::channel::<anyhow::Error>(3);

    {
        let tx = tx.clone();
        let addr = config.addr.clone();
        let maxsz = config.maxsz;
        tokio::spawn(async move {
            log::info!("listening on {}", addr);

            if let Err(e) = listen(&addr, maxsz).await {
                let _ = tx.send(e).await;
            }
        });
    }

    {
        let tx = tx.clone();
        let addr = config.addr.clone();
        let interval = config.heartbeat;
        tokio::spawn(async move {
            log::info!("sending {:?} every {:?}", identity, interval);

            if let Err(e) = heartbeat::announce(&addr, &identity, interval).await {
                let _ = tx.send(e).await;
            }
        });
    }

    tokio::spawn(async move {
        let _ = tx.send(signal::terminated().await).await;
    });

    if let Some(report) = rx.recv().await {
        log::error!("{:?}", report);
    }

    process::exit(1)
}

/// Joins the group and logs every datagram received on it, whatever
/// it contains; there is no validation that it is a heartbeat.
async fn listen(addr: &str, maxsz: usize) -> Result<()> {
    let receiver = Receiver::new(addr, maxsz).await?;
    receiver
        .run(|source, payload| {
            log::info!("{}: {}", source, String::from_utf8_lossy(payload).trim_end());
        })
        .await?;

    Ok(())
}

/// Parses an interval of the form `<count><unit>` where the unit is
/// one of `ms`, `s` or `m`; a bare count is taken as seconds.
fn parse_interval(value: &str) -> Result<Duration, String> {
    let digits = value.len() - value.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let (count, unit) = value.split_at(digits);

    let count = count
        .parse::<u64>()
        .map_err(|_| format!("invalid interval: {:?}", value))?;

    match unit {
        "ms" => Ok(Duration::from_millis(count)),
        "s" | "" => Ok(Duration::from_secs(count)),
        "m" => Ok(Duration::from_secs(count * 60)),
        _ => Err(format!("invalid interval unit: {:?}", unit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_intervals() {
        assert_eq!(parse_interval("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_interval("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_interval("7").unwrap(), Duration::from_secs(7));
    }

    #[test]
    fn rejects_junk_intervals() {
        assert!(parse_interval("").is_err());
        assert!(parse_interval("s").is_err());
        assert!(parse_interval("5h").is_err());
        assert!(parse_interval("five").is_err());
    }

    #[test]
    fn defaults_match_the_flag_table() {
        let config = Configure::parse_from(["beacon"]);

        assert_eq!(config.addr, "224.0.0.1:1234");
        assert_eq!(config.maxsz, 8192);
        assert_eq!(config.heartbeat, Duration::from_secs(5));
        assert!(config.identity.is_none());
    }
}
