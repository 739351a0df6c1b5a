//! A scoped timing guard: a value whose `Drop` impl writes the elapsed
//! duration into the call's metrics map.

use std::collections::HashMap;
use std::time::Instant;

pub struct StageTimer<'a> {
    label: &'static str,
    metrics: Option<&'a mut HashMap<String, f64>>,
    start: Instant,
}

impl<'a> StageTimer<'a> {
    pub fn start(label: &'static str, metrics: Option<&'a mut HashMap<String, f64>>) -> Self {
        Self { label, metrics, start: Instant::now() }
    }
}

impl Drop for StageTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        log::debug!("stage `{}` took {elapsed:.6}s", self.label);
        if let Some(metrics) = self.metrics.as_mut() {
            metrics.insert(self.label.to_string(), elapsed);
        }
    }
}
