use std::collections::HashMap;

/// Counter keyed by string with deterministic top-k selection: entries are
/// ranked by count descending, ties broken by first-seen order.
#[derive(Debug, Default, Clone)]
pub struct HitCounter {
    // Insertion-ordered storage; `index` maps key -> slot in `slots`.
    slots: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl HitCounter {
    pub fn bump(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&slot) => self.slots[slot].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.slots.len());
                self.slots.push((key.to_string(), 1));
            }
        }
    }

    pub fn get(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map(|&slot| self.slots[slot].1)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.slots.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Top `k` entries by count descending. A stable sort over the
    /// insertion-ordered slots gives the first-seen tie-break for free.
    pub fn top(&self, k: usize) -> Vec<(String, u64)> {
        let mut ranked = self.slots.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}

/// Mutable per-period counters, reset on every roll.
#[derive(Debug, Default)]
pub struct PeriodCounters {
    pub sections: HitCounter,
    pub users: HitCounter,
    pub error_sections: HitCounter,
    pub total_hits: u64,
    pub total_bytes: u64,
}

impl PeriodCounters {
    pub fn record(&mut self, record: &crate::model::LogRecord) {
        self.sections.bump(&record.section);
        self.users.bump(&record.user_id);
        self.total_hits += 1;
        self.total_bytes += record.size_bytes;
        if record.is_error() {
            self.error_sections.bump(&record.section);
        }
    }

    pub fn clear(&mut self) {
        self.sections.clear();
        self.users.clear();
        self.error_sections.clear();
        self.total_hits = 0;
        self.total_bytes = 0;
    }
}
