//! Console subscriber
//!
//! Prints each routed value to stdout. Values outside the configured range
//! are clamped before display; range policy belongs to the subscriber, not
//! the router.

use telemetry_decoder::SignalSink;

/// A subscriber that prints updates for one signal
pub struct ConsoleSink {
    label: String,
    min: Option<f64>,
    max: Option<f64>,
}

impl ConsoleSink {
    pub fn new(label: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        v
    }
}

impl SignalSink for ConsoleSink {
    fn update(&mut self, value: f64, name: &str) {
        let shown = self.clamp(value);
        if shown != value {
            println!("{} ({}): {:.3} [clamped from {:.3}]", self.label, name, shown, value);
        } else {
            println!("{} ({}): {:.3}", self.label, name, shown);
        }
    }
}
