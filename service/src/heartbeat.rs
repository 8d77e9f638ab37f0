use std::time::Duration;

use beacon_multicast::Sender;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Announces `identity` to the multicast group every `interval`,
/// forever, until a send fails.
///
/// The first heartbeat goes out after one full interval, there is no
/// immediate send on startup. Ticking is fixed period: a send that
/// overruns the interval drops the missed ticks instead of bursting
/// catch-up sends.
pub async fn announce(address: &str, identity: &str, interval: Duration) -> anyhow::Result<()> {
    let sender = Sender::new(address).await?;
    let message = format!("{}\n", identity);

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        sender.send(message.as_bytes()).await?;
    }
}
