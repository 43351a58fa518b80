//! Measurement accumulation and persistence.

use crate::record::EvaluationRecord;
use anyhow::Result;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write-only measurement log keyed by scenario name.
pub trait MeasurementSink: Send {
    fn append(&mut self, scenario: &str, record: &EvaluationRecord) -> Result<()>;
}

/// One JSON object per line, meant for offline analysis of a tuning run.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

#[derive(Serialize)]
struct SinkEntry<'a> {
    scenario: &'a str,
    #[serde(flatten)]
    record: &'a EvaluationRecord,
}

impl JsonlSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl MeasurementSink for JsonlSink {
    fn append(&mut self, scenario: &str, record: &EvaluationRecord) -> Result<()> {
        let entry = SinkEntry { scenario, record };
        serde_json::to_writer(&mut self.writer, &entry)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Append-only evaluation history plus the best-so-far record.
///
/// Best-so-far is the minimal-duration record among correctness-passing
/// records; only strict improvements replace it, so ties keep the earliest.
pub struct MeasurementRecorder {
    scenario: String,
    history: Vec<EvaluationRecord>,
    best: Option<usize>,
    sink: Option<Box<dyn MeasurementSink>>,
}

impl MeasurementRecorder {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            history: Vec::new(),
            best: None,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn MeasurementSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn record(&mut self, record: EvaluationRecord) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.append(&self.scenario, &record)?;
        }

        if record.is_viable() {
            let duration = record.duration_ms.expect("viable record has a duration");
            let improves = match self.best {
                Some(best_idx) => {
                    let best = self.history[best_idx]
                        .duration_ms
                        .expect("best record has a duration");
                    duration < best
                }
                None => true,
            };
            if improves {
                info!(
                    scenario = %self.scenario,
                    candidate = %record.candidate,
                    duration_ms = duration,
                    "new best candidate"
                );
                self.best = Some(self.history.len());
            }
        }

        self.history.push(record);
        Ok(())
    }

    pub fn history(&self) -> &[EvaluationRecord] {
        &self.history
    }

    pub fn evaluations(&self) -> usize {
        self.history.len()
    }

    pub fn best(&self) -> Option<&EvaluationRecord> {
        self.best.map(|idx| &self.history[idx])
    }
}
