//! Standard lane wiring: which sources run in which lane, in configuration order.

use claimcheck_core::{Lane, SignalSource};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::factcheck::FactCheckSource;
use crate::gnews::GNewsSource;
use crate::perplexity::{PerplexityClient, ReasoningSource};
use crate::settings::ProviderSettings;
use crate::tone::ToneSource;
use crate::virustotal::UrlReputationSource;

pub type LaneSources = BTreeMap<Lane, Vec<Arc<dyn SignalSource>>>;

/// Every lane with its production sources. Missing credentials do not fail
/// here; the affected sources report errors when called.
pub fn standard_sources(settings: &ProviderSettings) -> Result<LaneSources, ProviderError> {
    let http = settings.http_client()?;
    let reasoning = Arc::new(PerplexityClient::new(http.clone(), settings));

    let news: Vec<Arc<dyn SignalSource>> = vec![
        Arc::new(GNewsSource::new("gnews", http.clone(), settings)),
        Arc::new(FactCheckSource::new("news_fact_checker", http.clone(), settings)),
        Arc::new(ReasoningSource::new("news_web_reasoning", Lane::News, reasoning.clone())),
    ];
    let fact: Vec<Arc<dyn SignalSource>> = vec![
        Arc::new(FactCheckSource::new("fact_registry", http.clone(), settings)),
        Arc::new(ReasoningSource::new("fact_web_reasoning", Lane::Fact, reasoning.clone())),
    ];
    let scam: Vec<Arc<dyn SignalSource>> = vec![
        Arc::new(ToneSource::new("scam_tone")?),
        Arc::new(ReasoningSource::new("scam_web_reasoning", Lane::Scam, reasoning)),
        Arc::new(UrlReputationSource::new("url_reputation", http, settings)),
    ];

    Ok(BTreeMap::from([
        (Lane::News, news),
        (Lane::Fact, fact),
        (Lane::Scam, scam),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_are_wired_in_configuration_order() {
        let sources = standard_sources(&ProviderSettings::default()).unwrap();
        let names = |lane: Lane| -> Vec<String> {
            sources[&lane].iter().map(|s| s.name().to_string()).collect()
        };
        assert_eq!(names(Lane::News), ["gnews", "news_fact_checker", "news_web_reasoning"]);
        assert_eq!(names(Lane::Fact), ["fact_registry", "fact_web_reasoning"]);
        assert_eq!(names(Lane::Scam), ["scam_tone", "scam_web_reasoning", "url_reputation"]);
    }

    #[tokio::test]
    async fn offline_sources_work_without_credentials() {
        let sources = standard_sources(&ProviderSettings::default()).unwrap();
        let tone = &sources[&Lane::Scam][0];
        let record = tone.invoke("Act now to claim your prize").await.unwrap();
        assert!(record.is_ok());
    }
}
