//! Lane Runner
//!
//! Fans a claim out to every signal source of one lane and collects the
//! records back in configuration order. Never fails: timeouts, source errors
//! and aborted tasks all come back as `error` records.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::error::SourceError;
use crate::model::{Lane, SignalRecord};
use crate::source::SignalSource;

pub struct LaneRunner {
    lane: Lane,
    sources: Vec<Arc<dyn SignalSource>>,
    timeout: Duration,
    max_notes_chars: usize,
}

impl LaneRunner {
    pub fn new(lane: Lane, sources: Vec<Arc<dyn SignalSource>>, config: &EngineConfig) -> Self {
        Self {
            lane,
            sources,
            timeout: config.source_timeout(),
            max_notes_chars: config.max_notes_chars,
        }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Invoke every source concurrently; one record per source, configuration order.
    pub async fn run(&self, claim: &str) -> Vec<SignalRecord> {
        let started = Instant::now();
        let claim: Arc<str> = Arc::from(claim.trim());

        tracing::info!(lane = %self.lane, sources = ?self.source_names(), "Lane fan-out started");

        let handles: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let claim = Arc::clone(&claim);
                let timeout = self.timeout;
                tokio::spawn(async move { invoke_bounded(source.as_ref(), &claim, timeout).await })
            })
            .collect();

        // join_all yields in handle order, which is configuration order.
        let outcomes = join_all(handles).await;

        let records: Vec<SignalRecord> = outcomes
            .into_iter()
            .zip(&self.sources)
            .map(|(outcome, source)| {
                let result =
                    outcome.unwrap_or_else(|e| Err(SourceError::Panicked(e.to_string())));
                self.settle(source.name(), result)
            })
            .collect();

        tracing::info!(
            lane = %self.lane,
            records = records.len(),
            errors = records.iter().filter(|r| r.is_error()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Lane fan-in complete"
        );

        records
    }

    fn settle(&self, source: &str, result: Result<SignalRecord, SourceError>) -> SignalRecord {
        let mut record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    lane = %self.lane,
                    source,
                    error = %err,
                    "Signal source failed; recording error"
                );
                SignalRecord::error(source, err.to_string())
            }
        };
        record.source = source.to_string();
        let record = record.normalized(self.max_notes_chars);
        tracing::debug!(
            lane = %self.lane,
            source,
            status = %record.status,
            confidence = record.confidence,
            "Signal recorded"
        );
        record
    }
}

/// One source call: empty-claim guard, then the call under a timeout.
async fn invoke_bounded(
    source: &dyn SignalSource,
    claim: &str,
    timeout: Duration,
) -> Result<SignalRecord, SourceError> {
    if claim.trim().is_empty() {
        return Err(SourceError::EmptyClaim);
    }
    match tokio::time::timeout(timeout, source.invoke(claim)).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assessment, SignalStatus, Verdict};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Delayed {
        name: &'static str,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Delayed {
        fn new(name: &'static str, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                name,
                delay: Duration::from_millis(delay_ms),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SignalSource for Delayed {
        fn name(&self) -> &str {
            self.name
        }

        async fn invoke(&self, _claim: &str) -> Result<SignalRecord, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(SignalRecord::ok(
                self.name,
                Assessment::Verdict(Verdict::True),
                0.5,
            ))
        }
    }

    struct Failing;

    #[async_trait]
    impl SignalSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn invoke(&self, _claim: &str) -> Result<SignalRecord, SourceError> {
            Err(SourceError::Http {
                status: 401,
                body: "bad key".into(),
            })
        }
    }

    struct Panicking;

    #[async_trait]
    impl SignalSource for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn invoke(&self, _claim: &str) -> Result<SignalRecord, SourceError> {
            panic!("provider bug");
        }
    }

    fn config(timeout_ms: u64) -> EngineConfig {
        EngineConfig::default().with_source_timeout(Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn records_come_back_in_configuration_order() {
        let slow = Delayed::new("slow", 60);
        let fast = Delayed::new("fast", 1);
        let runner = LaneRunner::new(
            Lane::News,
            vec![slow.clone() as Arc<dyn SignalSource>, fast.clone()],
            &config(2_000),
        );

        let records = runner.run("claim").await;
        let names: Vec<_> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, vec!["slow", "fast"]);
        assert!(records.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn timeout_becomes_error_without_cancelling_siblings() {
        let stuck = Delayed::new("stuck", 5_000);
        let quick = Delayed::new("quick", 1);
        let runner = LaneRunner::new(
            Lane::Fact,
            vec![stuck as Arc<dyn SignalSource>, quick],
            &config(50),
        );

        let records = runner.run("claim").await;
        assert_eq!(records[0].status, SignalStatus::Error);
        assert_eq!(records[0].notes, "timed out after 50 ms");
        assert_eq!(records[0].confidence, 0.0);
        assert!(records[1].is_ok());
    }

    #[tokio::test]
    async fn empty_claim_short_circuits_without_calling_source() {
        let source = Delayed::new("gnews", 1);
        let runner = LaneRunner::new(
            Lane::News,
            vec![source.clone() as Arc<dyn SignalSource>],
            &config(1_000),
        );

        let records = runner.run("   ").await;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_error());
        assert_eq!(records[0].notes, "no claim text was supplied");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn source_error_and_panic_are_recorded() {
        let runner = LaneRunner::new(
            Lane::Scam,
            vec![
                Arc::new(Failing) as Arc<dyn SignalSource>,
                Arc::new(Panicking),
            ],
            &config(1_000),
        );

        let records = runner.run("claim").await;
        assert_eq!(records[0].notes, "HTTP 401: bad key");
        assert_eq!(records[0].source, "failing");
        assert!(records[1].is_error());
        assert!(records[1].notes.starts_with("source task aborted"));
    }

    #[test]
    fn exposes_configured_source_names() {
        let runner = LaneRunner::new(
            Lane::Scam,
            vec![Arc::new(Failing) as Arc<dyn SignalSource>, Arc::new(Panicking)],
            &config(1_000),
        );
        assert_eq!(runner.source_names(), vec!["failing", "panicking"]);
        assert!(!runner.is_empty());
        assert!(LaneRunner::new(Lane::Scam, Vec::new(), &config(1_000)).is_empty());
    }
}
