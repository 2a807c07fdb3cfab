use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::SignatureKind;
use crate::trace::{CallRecord, StateSnapshot};
use ethereum_types::U256;
use ethernity_core::types::RuleKind;
use ethernity_core::utils::{exceeds_ratio_bps, normalize_address, parse_quantity};
use serde::Serialize;

/// Slot de storage cujo valor saltou durante a transação
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceJump {
    pub address: String,
    pub slot: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleEvidence {
    pub suspicious_patterns: Vec<String>,
    pub swap_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stale_reads: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub price_jumps: Vec<PriceJump>,
}

/// Detector de manipulação de oráculos de preço
#[derive(Debug, Default)]
pub struct OracleManipulationDetector;

impl OracleManipulationDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for OracleManipulationDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::OracleManipulation
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let classified: Vec<(&CallRecord, Option<SignatureKind>)> =
            ctx.nested_calls().into_iter().map(|c| (c, ctx.kind_of(c))).collect();
        let kinds: Vec<Option<SignatureKind>> = classified.iter().map(|(_, k)| *k).collect();
        let is = |index: usize, wanted: SignatureKind| kinds[index] == Some(wanted);

        let has_flash_loan = kinds.contains(&Some(SignatureKind::FlashLoan));
        let has_oracle = kinds.iter().flatten().any(|k| k.is_oracle());
        let swap_positions: Vec<usize> = (0..kinds.len()).filter(|&i| is(i, SignatureKind::Swap)).collect();

        let mut patterns = Vec::new();

        let large_swap = swap_positions
            .iter()
            .any(|&i| classified[i].0.value_or_zero() > ctx.config.high_value_threshold);
        if has_flash_loan && has_oracle && large_swap {
            patterns.push("flash_loan_oracle_swap");
        }

        let sandwich = (2..kinds.len()).any(|i| {
            is(i - 2, SignatureKind::Swap) && is(i - 1, SignatureKind::OracleUpdate) && is(i, SignatureKind::Swap)
        });
        if sandwich {
            patterns.push("sandwich");
        }

        if swap_positions.len() >= ctx.config.twap_min_swaps {
            let borrow_after_swaps = swap_positions
                .last()
                .map(|&last| (last + 1..kinds.len()).any(|i| is(i, SignatureKind::Borrow)))
                .unwrap_or(false);
            if has_oracle || borrow_after_swaps {
                patterns.push("twap_manipulation");
            }
        }

        let stale_reads: Vec<String> = classified
            .iter()
            .filter(|(_, kind)| *kind == Some(SignatureKind::OracleRead))
            .filter(|(call, _)| {
                call.gas_used_amount()
                    .map(|gas| gas < U256::from(ctx.config.oracle_min_gas))
                    .unwrap_or(false)
            })
            .map(|(call, _)| call.to_address().unwrap_or_default())
            .collect();
        if !stale_reads.is_empty() {
            patterns.push("stale_oracle_read");
        }

        let price_jumps = match (&ctx.tx.trace.pre, &ctx.tx.trace.post) {
            (Some(pre), Some(post)) => storage_price_jumps(pre, post, ctx.config.price_jump_bps()),
            _ => Vec::new(),
        };
        if !price_jumps.is_empty() {
            patterns.push("price_jump");
        }

        if patterns.is_empty() {
            return None;
        }

        let evidence = OracleEvidence {
            suspicious_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            swap_count: swap_positions.len(),
            stale_reads,
            price_jumps,
        };
        Some(
            Finding::new(
                format!("Potential oracle manipulation: {}", patterns.join(", ")),
                Evidence::OracleManipulation(evidence),
            )
            .with_classification(patterns[0]),
        )
    }
}

/// Slots em que `post > pre × razão`; slots com `pre` zero são ignorados
pub fn storage_price_jumps(pre: &StateSnapshot, post: &StateSnapshot, ratio_bps: u64) -> Vec<PriceJump> {
    let mut jumps = Vec::new();

    for (address, before) in pre {
        let Some(after) = post
            .iter()
            .find(|(candidate, _)| normalize_address(candidate) == normalize_address(address))
            .map(|(_, state)| state)
        else {
            continue;
        };

        for (slot, old) in &before.storage {
            let Some(new) = after.storage.get(slot) else {
                continue;
            };
            let (Some(old_value), Some(new_value)) = (parse_quantity(old), parse_quantity(new)) else {
                continue;
            };
            if old_value.is_zero() {
                continue;
            }
            if exceeds_ratio_bps(new_value, old_value, ratio_bps) {
                jumps.push(PriceJump {
                    address: normalize_address(address),
                    slot: slot.clone(),
                    before: old_value.to_string(),
                    after: new_value.to_string(),
                });
            }
        }
    }

    jumps
}
