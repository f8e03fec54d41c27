//! Signal sources for the claimcheck engine
//!
//! HTTP clients for GNews, Google Fact Check Tools, VirusTotal and Perplexity,
//! plus an offline tone scanner. Each one implements
//! [`claimcheck_core::SignalSource`]; [`registry::standard_sources`] wires them
//! into lanes.

mod error;
mod http;

pub mod factcheck;
pub mod gnews;
pub mod perplexity;
pub mod registry;
pub mod settings;
pub mod text;
pub mod tone;
pub mod virustotal;

pub use error::ProviderError;
pub use factcheck::FactCheckSource;
pub use gnews::GNewsSource;
pub use perplexity::{PerplexityClient, ReasoningSource};
pub use registry::{standard_sources, LaneSources};
pub use settings::ProviderSettings;
pub use tone::{ToneScanner, ToneSource};
pub use virustotal::UrlReputationSource;
