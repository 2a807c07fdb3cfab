use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::SignatureKind;
use ethereum_types::U256;
use ethernity_core::types::RuleKind;
use ethernity_core::utils::u256_to_f64;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontRunningEvidence {
    /// Limite de gas da transação (decimal)
    pub gas: String,
    pub baseline: u64,
    /// Desvio percentual em relação ao baseline
    pub deviation_percent: f64,
    pub threshold: u64,
}

/// Detector de front-running por limite de gas anômalo
#[derive(Debug, Default)]
pub struct FrontRunningDetector;

impl FrontRunningDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for FrontRunningDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::FrontRunning
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        if ctx.is_legitimate() {
            debug!("front-running ignorado: transação legítima");
            return None;
        }

        let gas = ctx.tx.trace.gas_limit()?;
        let threshold = U256::from(ctx.config.gas_limit_threshold);
        if gas <= threshold {
            return None;
        }

        let baseline = ctx.config.gas_baseline;
        let deviation_percent = if baseline == 0 {
            0.0
        } else {
            (u256_to_f64(&gas) - baseline as f64) / baseline as f64 * 100.0
        };

        let spike = threshold.saturating_mul(U256::from(ctx.config.gas_spike_multiplier));
        let is_transfer = ctx.kind_of(&ctx.tx.trace.as_call()) == Some(SignatureKind::Transfer);

        let (classification, message) = if is_transfer && gas >= spike {
            (
                "transfer_gas_spike",
                format!(
                    "Potential front-running: token transfer with gas limit {} (at least {}x the {} threshold)",
                    gas, ctx.config.gas_spike_multiplier, threshold
                ),
            )
        } else {
            (
                "high_gas",
                format!(
                    "Potential front-running: gas limit {} exceeds threshold {} ({:.0}% above baseline)",
                    gas, threshold, deviation_percent
                ),
            )
        };

        let evidence = FrontRunningEvidence {
            gas: gas.to_string(),
            baseline,
            deviation_percent,
            threshold: ctx.config.gas_limit_threshold,
        };
        Some(Finding::new(message, Evidence::FrontRunning(evidence)).with_classification(classification))
    }
}
