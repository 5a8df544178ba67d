use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::time;
use tracing::{info, warn};
use trafficwatch_config::AppConfig;
use trafficwatch_core::{AlertKind, Aggregator, MonitorParams};
use trafficwatch_tui::DashboardState;

pub async fn run(config: AppConfig) -> Result<()> {
    let params = MonitorParams {
        stats_period_seconds: config.monitor.stats_period_seconds,
        alert_period_seconds: config.monitor.alert_period_seconds,
        alert_threshold_hits_per_sec: config.monitor.alert_threshold_hits_per_sec,
    };
    let mut aggregator = Aggregator::new(&config.monitor.log_file, params);
    let mut dashboard = DashboardState::new();

    let mut terminal = trafficwatch_tui::init()?;
    let result = run_loop(&mut terminal, &mut aggregator, &mut dashboard, &config).await;
    trafficwatch_tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut trafficwatch_tui::Tui,
    aggregator: &mut Aggregator,
    dashboard: &mut DashboardState,
    config: &AppConfig,
) -> Result<()> {
    // The first period tick fires immediately and establishes the read
    // baseline at end-of-file; real statistics start one period later.
    let mut period_tick = time::interval(Duration::from_secs(
        config.monitor.stats_period_seconds,
    ));
    let mut draw_tick = time::interval(Duration::from_millis(config.ui.tick_ms));
    let mut events = EventStream::new();

    loop {
        tokio::select! {
            _ = period_tick.tick() => {
                run_period(aggregator, dashboard);
            }
            _ = draw_tick.tick() => {
                terminal.draw(|f| trafficwatch_tui::ui(f, dashboard))?;
            }
            Some(event) = events.next() => {
                match event {
                    Ok(event) => {
                        if is_quit(&event) {
                            info!("monitoring ended by user");
                            break;
                        }
                    }
                    Err(exc) => {
                        warn!("terminal event error: {exc}");
                    }
                }
            }
        }
    }

    Ok(())
}

/// One monitoring period: ingest, snapshot, roll, evaluate. The snapshot
/// is taken strictly before the roll, which clears the counters it reads.
fn run_period(aggregator: &mut Aggregator, dashboard: &mut DashboardState) {
    match aggregator.ingest_new_lines() {
        Ok(summary) => {
            if summary.truncated {
                warn!("log source shrank below the cursor; re-read from the start");
            }
        }
        Err(err) if err.is_transient() => {
            warn!("skipping ingestion this period: {err}");
        }
        Err(err) => {
            warn!("ingestion failed, counters left unchanged: {err}");
        }
    }

    dashboard.apply_report(aggregator.snapshot_report());
    aggregator.roll_period();

    let event = aggregator.evaluate_alert();
    match event.kind {
        AlertKind::Started => info!(
            "high traffic alert started at {:.0} hits/s",
            event.hits_per_second.unwrap_or_default()
        ),
        AlertKind::Recovered => info!(
            "high traffic alert recovered at {:.0} hits/s",
            event.hits_per_second.unwrap_or_default()
        ),
        AlertKind::Unchanged => {}
    }
    dashboard.apply_alert(&event);
}

fn is_quit(event: &Event) -> bool {
    let Event::Key(key) = event else {
        return false;
    };
    if key.kind != KeyEventKind::Press {
        return false;
    }
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
