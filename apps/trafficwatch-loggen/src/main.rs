//! Generates an actively written-to W3C access log with a varying line
//! rate, so the monitor's statistics and traffic alerts have something
//! interesting to chew on.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USERS: &[(&str, &str)] = &[
    ("192.168.0.1", "Corentin"),
    ("192.168.0.2", "Remi"),
    ("192.168.0.3", "Antoine"),
    ("192.168.0.4", "Jacques"),
    ("192.168.0.5", "Brandon"),
    ("192.168.0.6", "Snoopdog"),
];
const METHODS: &[&str] = &["GET", "PUT", "POST", "DELETE"];
const STATUSES: &[u16] = &[100, 200, 300, 404, 500];
const FRUIT_PAGES: &[&str] = &[
    "orange.jpg",
    "lemon.jpg",
    "kiwi.jpg",
    "lime.jpg",
    "pineapple.jpg",
];
const VEGETABLE_PAGES: &[&str] = &[
    "artichoke.jpg",
    "asparagus.jpg",
    "corn.jpg",
    "pea.jpg",
    "potato.jpg",
];
const OTHER_PAGES: &[&str] = &["rice.jpg", "pasta.jpg", "mushroom.jpg", "42.jpg"];

/// Roughly one peak every this many baseline lines.
const PEAK_ODDS: u64 = 1500;

#[derive(Debug, Parser)]
#[command(
    name = "trafficwatch-loggen",
    about = "Synthetic W3C access-log generator with randomized traffic peaks"
)]
struct Cli {
    /// Log file to append to.
    #[arg(short = 'p', long = "path", default_value = "access.log")]
    path: PathBuf,

    /// Do not echo generated lines to stdout.
    #[arg(long)]
    quiet: bool,
}

fn pick<'a, T: ?Sized>(rng: &mut StdRng, items: &[&'a T]) -> &'a T {
    items[rng.gen_range(0..items.len())]
}

fn generate_line(rng: &mut StdRng) -> String {
    let (ip, user) = USERS[rng.gen_range(0..USERS.len())];
    let (section, pages) = match rng.gen_range(0..3) {
        0 => ("fruits", FRUIT_PAGES),
        1 => ("vegetables", VEGETABLE_PAGES),
        _ => ("others", OTHER_PAGES),
    };
    let page = pick(rng, pages);
    let method = pick(rng, METHODS);
    let status = STATUSES[rng.gen_range(0..STATUSES.len())];
    let size: u64 = rng.gen_range(0..=10_000);
    let timestamp = Local::now().format("%d/%b/%Y:%H:%M:%S %z");

    format!(r#"{ip} - {user} [{timestamp}] "{method} /{section}/{page} HTTP/1.1" {status} {size}"#)
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.path)
        .with_context(|| format!("failed to open {}", cli.path.display()))?;
    info!("appending generated traffic to {}", cli.path.display());

    let mut rng = StdRng::from_entropy();
    let mut peak_until: Option<Instant> = None;

    loop {
        let in_peak = peak_until.is_some_and(|until| Instant::now() < until);
        if !in_peak {
            peak_until = None;
            if rng.gen_range(0..PEAK_ODDS) == 0 {
                let duration = Duration::from_secs(rng.gen_range(60..=120));
                info!("traffic peak for the next {}s", duration.as_secs());
                peak_until = Some(Instant::now() + duration);
            }
        }

        // Baseline is ~5-20 lines/s; peaks push ~30-60 lines/s.
        let delay_ms = if peak_until.is_some() {
            rng.gen_range(15..=30)
        } else {
            rng.gen_range(50..=200)
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("log generation ended by user");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
        }

        let line = generate_line(&mut rng);
        writeln!(file, "{line}")
            .and_then(|_| file.flush())
            .with_context(|| format!("failed to append to {}", cli.path.display()))?;
        if !cli.quiet {
            println!("{line}");
        }
    }

    Ok(())
}
