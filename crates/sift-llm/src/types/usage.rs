use serde::{Deserialize, Serialize};
use sift_core::config::PricingConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }

    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
    }
}

/// USD per million prompt / completion tokens.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Pricing {
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    pub fn estimate(&self, usage: &TokenUsage) -> f64 {
        (usage.prompt_tokens as f64 * self.input_per_million
            + usage.completion_tokens as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

impl From<PricingConfig> for Pricing {
    fn from(config: PricingConfig) -> Self {
        Self::new(config.input_per_million, config.output_per_million)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_accumulates() {
        let mut total = TokenUsage::default();
        total.accumulate(&TokenUsage::new(100, 20));
        total.accumulate(&TokenUsage::new(150, 30));

        assert_eq!(total.prompt_tokens, 250);
        assert_eq!(total.completion_tokens, 50);
        assert_eq!(total.total(), 300);
    }

    #[test]
    fn test_cost_estimate() {
        let pricing = Pricing::new(5.0, 15.0);
        let cost = pricing.estimate(&TokenUsage::new(1_000_000, 200_000));
        assert!((cost - 8.0).abs() < 1e-9);

        assert_eq!(pricing.estimate(&TokenUsage::default()), 0.0);
    }
}
