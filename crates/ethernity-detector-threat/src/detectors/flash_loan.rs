use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::SignatureKind;
use crate::trace::CallRecord;
use ethernity_core::types::RuleKind;
use ethernity_core::utils::meets_ratio_bps;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashLoanCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Par empréstimo/devolução dentro da mesma transação
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowRepay {
    pub lender: String,
    pub borrower: String,
    pub borrowed: String,
    pub repaid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashLoanEvidence {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flash_loan_calls: Vec<FlashLoanCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrow_repay: Option<BorrowRepay>,
}

/// Detector de flash loans: assinaturas de provedores ou formato
/// empréstimo + devolução
#[derive(Debug, Default)]
pub struct FlashLoanDetector;

impl FlashLoanDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for FlashLoanDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::FlashLoan
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let calls = ctx.nested_calls();
        let mut reasons = Vec::new();

        let flash_loan_calls: Vec<FlashLoanCall> = calls
            .iter()
            .filter(|c| ctx.kind_of(c) == Some(SignatureKind::FlashLoan))
            .map(|c| FlashLoanCall {
                provider: c.to_address(),
                signature: ctx.signature_of(c),
            })
            .collect();
        if !flash_loan_calls.is_empty() {
            reasons.push(format!("{} flash loan provider call(s)", flash_loan_calls.len()));
        }

        let borrow_repay = find_borrow_repay(ctx, &calls);
        if let Some(pair) = &borrow_repay {
            reasons.push(format!(
                "{} wei borrowed from {} and {} wei returned in the same transaction",
                pair.borrowed, pair.lender, pair.repaid
            ));
        }

        if reasons.is_empty() {
            return None;
        }

        let classification = if borrow_repay.is_some() { "borrow_repay" } else { "provider_signature" };
        let evidence = FlashLoanEvidence {
            flash_loan_calls,
            borrow_repay,
        };
        Some(
            Finding::new(
                format!("Potential flash loan: {}", reasons.join(", ")),
                Evidence::FlashLoan(evidence),
            )
            .with_classification(classification),
        )
    }
}

/// Chamada com valor acima do teto seguida de uma devolução de mesma
/// magnitude ao chamador original
fn find_borrow_repay(ctx: &EvaluationContext<'_>, calls: &[&CallRecord]) -> Option<BorrowRepay> {
    for (i, loan) in calls.iter().enumerate() {
        let borrowed = loan.value_or_zero();
        if borrowed <= ctx.config.high_value_threshold {
            continue;
        }
        let Some(lender) = loan.from_address() else {
            continue;
        };

        let repayment = calls[i + 1..].iter().find(|later| {
            later.to_address().as_deref() == Some(lender.as_str())
                && meets_ratio_bps(later.value_or_zero(), borrowed, ctx.config.flash_loan_repay_ratio_bps)
        });

        if let Some(repayment) = repayment {
            return Some(BorrowRepay {
                borrower: loan.to_address().unwrap_or_default(),
                lender,
                borrowed: borrowed.to_string(),
                repaid: repayment.value_or_zero().to_string(),
            });
        }
    }
    None
}
