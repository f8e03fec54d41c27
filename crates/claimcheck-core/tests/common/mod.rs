//! In-process signal sources for engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use claimcheck_core::{Assessment, Evidence, Risk, SignalRecord, SignalSource, SourceError, Verdict};

/// Canned outcome returned after an optional delay; counts its invocations.
pub struct FakeSource {
    name: String,
    delay: Duration,
    outcome: Result<SignalRecord, SourceError>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn returning(name: &str, record: SignalRecord) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            outcome: Ok(record),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &str, error: SourceError) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn delayed(name: &str, delay_ms: u64, record: SignalRecord) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
            outcome: Ok(record),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, _claim: &str) -> Result<SignalRecord, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

pub fn as_sources(fakes: &[Arc<FakeSource>]) -> Vec<Arc<dyn SignalSource>> {
    fakes
        .iter()
        .map(|fake| Arc::clone(fake) as Arc<dyn SignalSource>)
        .collect()
}

pub fn verdict(source: &str, verdict: Verdict, confidence: f64) -> SignalRecord {
    SignalRecord::ok(source, Assessment::Verdict(verdict), confidence)
}

pub fn cited(
    source: &str,
    value: Verdict,
    confidence: f64,
    sources: &[(&str, &str)],
) -> SignalRecord {
    verdict(source, value, confidence).with_evidence(
        sources
            .iter()
            .map(|(label, url)| Evidence::new(*label, *url))
            .collect(),
    )
}

pub fn risk(source: &str, level: Risk, confidence: f64) -> SignalRecord {
    SignalRecord::ok(source, Assessment::Risk(level), confidence)
}
