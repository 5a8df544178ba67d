use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    /// Average hit rate crossed the threshold upward.
    Started,
    /// Average hit rate dropped back below the threshold.
    Recovered,
    /// No transition this period.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    /// Carried only on `Started` and `Recovered`.
    pub hits_per_second: Option<f64>,
}

/// Edge-triggered hysteresis gate over the average hit rate. Sustained high
/// traffic or sustained calm emits `Unchanged`, never a repeated
/// `Started`/`Recovered`.
#[derive(Debug, Default)]
pub struct AlertGate {
    on_alert: bool,
}

impl AlertGate {
    pub fn on_alert(&self) -> bool {
        self.on_alert
    }

    pub fn evaluate(&mut self, rate: f64, threshold: f64) -> AlertEvent {
        if !self.on_alert && rate >= threshold {
            self.on_alert = true;
            return AlertEvent {
                kind: AlertKind::Started,
                hits_per_second: Some(rate),
            };
        }
        if self.on_alert && rate < threshold {
            self.on_alert = false;
            return AlertEvent {
                kind: AlertKind::Recovered,
                hits_per_second: Some(rate),
            };
        }
        AlertEvent {
            kind: AlertKind::Unchanged,
            hits_per_second: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AlertGate, AlertKind};

    #[test]
    fn crossing_upward_starts_exactly_once() {
        let mut gate = AlertGate::default();
        let event = gate.evaluate(40.0, 20.0);
        assert_eq!(event.kind, AlertKind::Started);
        assert_eq!(event.hits_per_second, Some(40.0));
        assert!(gate.on_alert());

        let event = gate.evaluate(45.0, 20.0);
        assert_eq!(event.kind, AlertKind::Unchanged);
        assert_eq!(event.hits_per_second, None);
    }

    #[test]
    fn crossing_downward_recovers_exactly_once() {
        let mut gate = AlertGate::default();
        gate.evaluate(40.0, 20.0);

        let event = gate.evaluate(10.0, 20.0);
        assert_eq!(event.kind, AlertKind::Recovered);
        assert_eq!(event.hits_per_second, Some(10.0));
        assert!(!gate.on_alert());

        let event = gate.evaluate(5.0, 20.0);
        assert_eq!(event.kind, AlertKind::Unchanged);
    }

    #[test]
    fn rate_equal_to_threshold_counts_as_alerting() {
        let mut gate = AlertGate::default();
        assert_eq!(gate.evaluate(20.0, 20.0).kind, AlertKind::Started);
    }
}
