use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use ethernity_core::types::RuleKind;
use ethernity_core::utils::format_ether;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbnormalValueEvidence {
    /// Valor transferido em wei (decimal)
    pub value: String,
    pub threshold: String,
    pub value_eth: String,
}

/// Detector de transferências acima do teto configurado
#[derive(Debug, Default)]
pub struct AbnormalValueDetector;

impl AbnormalValueDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for AbnormalValueDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::AbnormalValue
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let value = ctx.tx.trace.value_wei()?;
        let threshold = ctx.config.high_value_threshold;
        if value <= threshold {
            return None;
        }

        let evidence = AbnormalValueEvidence {
            value: value.to_string(),
            threshold: threshold.to_string(),
            value_eth: format_ether(&value),
        };
        Some(Finding::new(
            format!(
                "Abnormal value: transfer of {} exceeds threshold of {}",
                format_ether(&value),
                format_ether(&threshold)
            ),
            Evidence::AbnormalValue(evidence),
        ))
    }
}
