use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::pipeline::TaskResult;
use crate::resources::Record;
use crate::sink::Sink;
use crate::Result;

/// Counts how many nameservers returned which answer.
///
/// Answers are keyed by their canonical form, e.g., `A 93.184.216.34`. A nameserver returning the same answer
/// more than once is counted once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    attempted: usize,
    succeeded: usize,
    answers: IndexMap<String, usize>,
    errors: IndexMap<String, usize>,
}

impl Distribution {
    pub fn new() -> Distribution {
        Default::default()
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    /// Share of successful nameservers; 0 if nothing has been attempted
    pub fn success_ratio(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.attempted as f64
    }

    pub fn count(&self, canonical: &str) -> usize {
        self.answers.get(canonical).copied().unwrap_or(0)
    }

    pub fn answers(&self) -> &IndexMap<String, usize> {
        &self.answers
    }

    /// Error counts by kind, cf. `resolver::Error::kind_name`
    pub fn errors(&self) -> &IndexMap<String, usize> {
        &self.errors
    }

    /// Answers by descending count; answers with equal counts stay in the order they were seen first.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut answers: Vec<_> = self.answers.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        answers.sort_by(|a, b| b.1.cmp(&a.1));
        answers
    }

    fn record(&mut self, result: &TaskResult) {
        self.attempted += 1;
        match &result.outcome {
            Ok(records) => {
                self.succeeded += 1;
                let distinct: IndexSet<String> = records.iter().map(Record::canonical).collect();
                for canonical in distinct {
                    *self.answers.entry(canonical).or_insert(0) += 1;
                }
            }
            Err(err) => {
                *self.errors.entry(err.kind_name().to_string()).or_insert(0) += 1;
            }
        }
    }
}

impl Sink for Distribution {
    type Output = Distribution;

    fn accept(&mut self, result: TaskResult) -> Result<()> {
        self.record(&result);
        Ok(())
    }

    fn finish(self) -> Result<Distribution> {
        Ok(self)
    }
}
