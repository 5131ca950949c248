//! Demo receiver served by the `objrpc-server` binary.

use objrpc::{MethodTable, Receiver};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A small receiver exercising each method shape.
#[derive(Debug, Default)]
pub struct Demo {
    ticks: AtomicU64,
}

/// Divide request.
#[derive(Debug, Deserialize)]
pub struct Division {
    pub dividend: f64,
    pub divisor: f64,
}

/// Summary of a list of numbers.
#[derive(Debug, Serialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Demo {
    pub fn half(&self, i: i64) -> i64 {
        i / 2
    }

    pub fn greet(&self, name: String) -> String {
        format!("Hello, {}!", name)
    }

    pub fn stats(&self, values: Vec<f64>) -> Result<Summary, String> {
        if values.is_empty() {
            return Err("Stats of an empty list".to_string());
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Ok(Summary {
            count: values.len(),
            min,
            max,
            mean,
        })
    }

    pub fn divide(&self, division: &mut Division) -> Result<f64, String> {
        if division.divisor == 0.0 {
            return Err("Division by zero".to_string());
        }
        Ok(division.dividend / division.divisor)
    }

    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Receiver for Demo {
    fn declare(methods: &mut MethodTable<Self>) {
        methods
            .method_with("Half", Demo::half)
            .method_with("Greet", Demo::greet)
            .method_with("Stats", Demo::stats)
            .method_with_ref("Divide", Demo::divide)
            .method("Tick", Demo::tick)
            .method("Count", Demo::count);
    }
}
