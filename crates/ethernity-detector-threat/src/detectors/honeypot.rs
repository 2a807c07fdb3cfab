use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::SignatureKind;
use ethernity_core::types::RuleKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedWithdrawal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// A chamada terminou com erro (e não apenas sem retorno)
    pub reverted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoneypotEvidence {
    pub blocked_withdrawals: Vec<BlockedWithdrawal>,
}

/// Detector de honeypots: saques que não retornam dados
#[derive(Debug, Default)]
pub struct HoneypotDetector;

impl HoneypotDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for HoneypotDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::Honeypot
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let blocked: Vec<BlockedWithdrawal> = ctx
            .nested_calls()
            .into_iter()
            .filter(|c| ctx.kind_of(c) == Some(SignatureKind::Withdraw))
            .filter(|c| c.output_digits().is_empty() || c.error.is_some())
            .map(|c| BlockedWithdrawal {
                contract: c.to_address(),
                caller: c.from_address(),
                signature: ctx.signature_of(c),
                reverted: c.error.is_some(),
            })
            .collect();

        if blocked.is_empty() {
            return None;
        }

        let contracts: Vec<&str> = blocked.iter().filter_map(|b| b.contract.as_deref()).collect();
        let message = format!(
            "Potential honeypot: {} withdrawal(s) returned no data ({})",
            blocked.len(),
            if contracts.is_empty() { "unknown contract".to_string() } else { contracts.join(", ") }
        );
        Some(Finding::new(
            message,
            Evidence::Honeypot(HoneypotEvidence {
                blocked_withdrawals: blocked,
            }),
        ))
    }
}
