//! Live terminal dashboard: a statistics pane for the last completed
//! period and an append-only pane of alert transitions.

use anyhow::Result;
use chrono::Local;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::collections::VecDeque;
use std::io::{stdout, Stdout};
use trafficwatch_core::{AlertEvent, AlertKind, PeriodReport};

/// Alert entries kept in the scrollback before the oldest are dropped.
const MAX_ALERT_LINES: usize = 200;

const HEADER_STATS: &str = "Statistics of the last period";
const HEADER_ALERTS: &str = "History of traffic alerts";
const STATS_WAITING: &str = "Please wait for the first monitoring period to end.";
const STATS_NO_TRAFFIC: &str = "There was no traffic on the period.";
const FOOTER_HINT: &str = "Press 'q' to end monitoring and return to the terminal";

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn init() -> Result<Tui> {
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore() -> Result<()> {
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AlertLine {
    pub text: String,
    pub kind: AlertKind,
}

/// Everything the dashboard renders. Owned by the orchestration loop and
/// passed into `ui` on every draw tick; no global screen state.
#[derive(Debug, Default)]
pub struct DashboardState {
    latest: Option<PeriodReport>,
    alerts: VecDeque<AlertLine>,
    on_alert: bool,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_report(&self) -> Option<&PeriodReport> {
        self.latest.as_ref()
    }

    pub fn alert_lines(&self) -> impl Iterator<Item = &AlertLine> {
        self.alerts.iter()
    }

    pub fn on_alert(&self) -> bool {
        self.on_alert
    }

    pub fn apply_report(&mut self, report: PeriodReport) {
        self.latest = Some(report);
    }

    /// Folds an alert transition into the scrollback. `Unchanged` events
    /// leave the pane as it is.
    pub fn apply_alert(&mut self, event: &AlertEvent) {
        let timestamp = Local::now().format("%H:%M:%S");
        match event.kind {
            AlertKind::Started => {
                self.on_alert = true;
                let rate = event.hits_per_second.unwrap_or_default();
                self.push_line(AlertLine {
                    text: format!(
                        "High traffic generated an alert - hits/s: {rate:.0} (triggered at {timestamp})"
                    ),
                    kind: AlertKind::Started,
                });
            }
            AlertKind::Recovered => {
                self.on_alert = false;
                let rate = event.hits_per_second.unwrap_or_default();
                self.push_line(AlertLine {
                    text: format!("Recovered at {timestamp}, hits/s: {rate:.0}"),
                    kind: AlertKind::Recovered,
                });
            }
            AlertKind::Unchanged => {}
        }
    }

    fn push_line(&mut self, line: AlertLine) {
        self.alerts.push_back(line);
        if self.alerts.len() > MAX_ALERT_LINES {
            self.alerts.pop_front();
        }
    }
}

pub fn ui(f: &mut Frame, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    render_stats_pane(f, panes[0], state);
    render_alerts_pane(f, panes[1], state);
    f.render_widget(Paragraph::new(FOOTER_HINT), chunks[1]);
}

fn render_stats_pane(f: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(HEADER_STATS)
        .border_style(Style::default().fg(Color::Blue));

    let text = match state.latest_report() {
        // Period index 0 is the warm-up period; nothing completed yet.
        None => STATS_WAITING.to_string(),
        Some(report) if report.period_index == 0 => STATS_WAITING.to_string(),
        Some(report) => stats_text(report),
    };

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn stats_text(report: &PeriodReport) -> String {
    let mut lines = vec![format!("Monitoring period number: {}", report.period_index)];
    if report.total_hits == 0 {
        lines.push(String::new());
        lines.push(STATS_NO_TRAFFIC.to_string());
        return lines.join("\n");
    }

    lines.push(format!("Number of hits: {}", report.total_hits));
    lines.push(String::new());
    push_top_list(&mut lines, "Top 3 sections:", &report.top_sections);
    push_top_list(&mut lines, "Top 3 users:", &report.top_users);
    push_top_list(
        &mut lines,
        "Top 3 sections with most errors:",
        &report.top_error_sections,
    );
    lines.push(format!(
        "Total traffic on period (bytes): {}",
        report.total_bytes
    ));
    lines.join("\n")
}

fn push_top_list(lines: &mut Vec<String>, header: &str, entries: &[(String, u64)]) {
    lines.push(header.to_string());
    for (rank, (key, hits)) in entries.iter().enumerate() {
        let label = if key.is_empty() { "/" } else { key };
        lines.push(format!("  {}. {label}: {hits}", rank + 1));
    }
    lines.push(String::new());
}

fn render_alerts_pane(f: &mut Frame, area: Rect, state: &DashboardState) {
    let border = if state.on_alert() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Magenta)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(HEADER_ALERTS)
        .border_style(border);

    // Newest entries stay visible: keep only what fits in the pane.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = state.alerts.len().saturating_sub(visible);
    let items: Vec<ListItem> = state
        .alert_lines()
        .skip(skip)
        .map(|line| {
            let style = match line.kind {
                AlertKind::Started => Style::default().fg(Color::Red),
                AlertKind::Recovered => Style::default().fg(Color::Green),
                AlertKind::Unchanged => Style::default(),
            };
            ListItem::new(Line::from(Span::styled(line.text.clone(), style)))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::{ui, DashboardState, MAX_ALERT_LINES};
    use ratatui::{backend::TestBackend, Terminal};
    use trafficwatch_core::{AlertEvent, AlertKind, PeriodReport};

    fn report(period_index: u64, hits: u64) -> PeriodReport {
        PeriodReport {
            period_index,
            total_hits: hits,
            total_bytes: hits * 100,
            top_sections: vec![("fruits".to_string(), hits)],
            top_users: vec![("frank".to_string(), hits)],
            top_error_sections: vec![],
        }
    }

    fn event(kind: AlertKind, rate: Option<f64>) -> AlertEvent {
        AlertEvent {
            kind,
            hits_per_second: rate,
        }
    }

    #[test]
    fn started_and_recovered_append_lines_unchanged_does_not() {
        let mut state = DashboardState::new();
        state.apply_alert(&event(AlertKind::Started, Some(40.0)));
        state.apply_alert(&event(AlertKind::Unchanged, None));
        state.apply_alert(&event(AlertKind::Recovered, Some(10.0)));
        state.apply_alert(&event(AlertKind::Unchanged, None));

        let lines: Vec<_> = state.alert_lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].text.contains("hits/s: 40"));
        assert!(lines[1].text.starts_with("Recovered at "));
        assert!(!state.on_alert());
    }

    #[test]
    fn alert_backlog_is_bounded() {
        let mut state = DashboardState::new();
        for _ in 0..(MAX_ALERT_LINES + 25) {
            state.apply_alert(&event(AlertKind::Started, Some(40.0)));
            state.apply_alert(&event(AlertKind::Recovered, Some(10.0)));
        }
        assert_eq!(state.alert_lines().count(), MAX_ALERT_LINES);
    }

    #[test]
    fn dashboard_renders_waiting_message_before_first_period() {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        let state = DashboardState::new();

        terminal.draw(|f| ui(f, &state)).expect("draw dashboard");
        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains("Please wait"));
        assert!(rendered.contains("Statistics of the last period"));
        assert!(rendered.contains("History of traffic alerts"));
    }

    #[test]
    fn dashboard_renders_report_numbers() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        let mut state = DashboardState::new();
        state.apply_report(report(3, 42));

        terminal.draw(|f| ui(f, &state)).expect("draw dashboard");
        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains("Monitoring period number: 3"));
        assert!(rendered.contains("Number of hits: 42"));
        assert!(rendered.contains("1. fruits: 42"));
    }
}
