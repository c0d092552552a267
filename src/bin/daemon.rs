use std::time::Duration;

use clap::Parser;
use jiff::Zoned;
use tokio::time::MissedTickBehavior;
use tomorrow_tip::config::Config;
use tomorrow_tip::notify::{LogNotifier, StdoutNotifier};
use tomorrow_tip::{Result, TomorrowTip};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    /// Write notifications to stdout as JSON lines instead of the log.
    #[clap(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tomorrow_tip=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    let mut tip = if args.json {
        TomorrowTip::from_config(&config, StdoutNotifier)
    } else {
        TomorrowTip::from_config(&config, LogNotifier)
    };

    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        schedule = ?config.schedule_name,
        settings = %config.settings_file.display(),
        "watching for reminder time"
    );
    loop {
        tokio::select! {
            _ = interval.tick() => {
                tip.on_tick(Zoned::now().datetime());
            }
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
