//! SignalSource trait: the only boundary between the engine and provider clients.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::SignalRecord;

/// An external capability that assesses a claim.
///
/// Implementations are untrusted: the lane runner bounds each call with a
/// timeout, converts failures into `error` records and normalizes whatever
/// comes back.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Stable name used for attribution in gap notes and logs.
    fn name(&self) -> &str;

    /// Assess a non-empty claim.
    async fn invoke(&self, claim: &str) -> Result<SignalRecord, SourceError>;
}
