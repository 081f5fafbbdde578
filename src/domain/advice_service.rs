//! Optional parenting-advice integration.
//!
//! The provider is pluggable and allowed to be absent or broken; advice is
//! decorative, so every failure path collapses to a fixed fallback string
//! rather than an error the caller has to handle.

use log::warn;

/// Shown whenever no provider is configured or the provider fails.
pub const FALLBACK_ADVICE: &str =
    "Keep tasks small and consistent: a few achievable chores with steady rewards \
     teach more than occasional big payouts.";

/// A source of parenting advice, typically backed by an external service.
pub trait AdviceProvider: Send + Sync {
    fn advice(&self, query: &str) -> anyhow::Result<String>;
}

pub struct AdviceService {
    provider: Option<Box<dyn AdviceProvider>>,
}

impl AdviceService {
    pub fn new(provider: Option<Box<dyn AdviceProvider>>) -> Self {
        Self { provider }
    }

    pub fn disabled() -> Self {
        Self { provider: None }
    }

    /// Ask for advice on a parenting question. Never fails: provider errors
    /// are logged and replaced with the fallback text.
    pub fn parental_advice(&self, query: &str) -> String {
        let Some(provider) = &self.provider else {
            return FALLBACK_ADVICE.to_string();
        };

        match provider.advice(query) {
            Ok(text) => text,
            Err(e) => {
                warn!("Advice provider failed, using fallback: {}", e);
                FALLBACK_ADVICE.to_string()
            }
        }
    }
}
