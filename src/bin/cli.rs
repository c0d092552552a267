use clap::Parser;
use jiff::Zoned;
use jiff::civil::Date;
use tomorrow_tip::config::Config;
use tomorrow_tip::notify::StdoutNotifier;
use tomorrow_tip::parity::{ConfigCenter, WeekParityResolver};
use tomorrow_tip::{Result, TomorrowTip};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
enum Command {
    /// Print the courses on a day, tomorrow by default.
    Preview {
        #[clap(long)]
        date: Option<Date>,
    },
    /// Send tomorrow's reminder now, ignoring the reminder time.
    TestNotify,
    /// Print whether a day falls in an odd or even week.
    Parity {
        #[clap(long)]
        date: Option<Date>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tomorrow_tip=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    let today = Zoned::now().date();

    match args.cmd {
        Command::Preview { date } => {
            let date = match date {
                Some(date) => date,
                None => today.tomorrow()?,
            };
            let tip = TomorrowTip::from_config(&config, StdoutNotifier);
            let courses = tip.courses_on(date)?;
            println!("{date} ({:?})", date.weekday());
            if courses.is_empty() {
                println!("  no courses");
            }
            for course in courses {
                let time = course.time_label().unwrap_or_default();
                println!("  {time:<13} {}", course.name);
            }
        }
        Command::TestNotify => {
            let tip = TomorrowTip::from_config(&config, StdoutNotifier);
            tip.send_test(Zoned::now().datetime())?;
        }
        Command::Parity { date } => {
            let date = date.unwrap_or(today);
            let resolver = match &config.config_center_file {
                Some(path) => WeekParityResolver::new(ConfigCenter::new(path)),
                None => WeekParityResolver::default(),
            };
            println!("{date}: {} week", resolver.resolve(date));
        }
    }

    Ok(())
}
