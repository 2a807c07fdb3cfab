use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::SignatureKind;
use ethereum_types::U256;
use ethernity_core::types::RuleKind;
use ethernity_core::utils::{decode_hex, parse_quantity};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossChainEvidence {
    pub suspicious_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawn_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_calls: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_deviation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minted_amount: Option<String>,
}

/// Detector de ataques a bridges entre chains
#[derive(Debug, Default)]
pub struct CrossChainAttackDetector;

impl CrossChainAttackDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for CrossChainAttackDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::CrossChainAttack
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let aux = &ctx.tx.context;
        if ctx.is_legitimate() || aux.is_known_false_positive() {
            debug!("cross-chain ignorado: transação legítima ou falso positivo conhecido");
            return None;
        }

        let calls = ctx.nested_calls();
        let recipient = ctx.tx.trace.recipient();
        let mut patterns = Vec::new();
        let mut evidence = CrossChainEvidence {
            suspicious_patterns: Vec::new(),
            withdrawn_amount: None,
            verification_calls: None,
            price_deviation: None,
            locked_amount: None,
            minted_amount: None,
        };

        let withdrawn = calls
            .iter()
            .filter(|c| c.from_address().as_deref() == Some(recipient.as_str()))
            .map(|c| c.value_or_zero())
            .filter(|value| *value > ctx.config.high_value_threshold)
            .max();
        if let Some(amount) = withdrawn {
            patterns.push("unauthorized_withdrawal");
            evidence.withdrawn_amount = Some(amount.to_string());
        }

        let verifications: Vec<_> = calls
            .iter()
            .filter(|c| ctx.kind_of(c) == Some(SignatureKind::ProofVerification))
            .collect();
        let weak_proof = verifications.iter().any(|c| {
            c.gas_used_amount()
                .map(|gas| gas < U256::from(ctx.config.proof_min_gas))
                .unwrap_or(false)
        });
        // A contagem mínima de verificações só vale para operações de bridge
        let is_bridge_operation = ctx.kind_of(&ctx.tx.trace.as_call()) == Some(SignatureKind::Bridge)
            || calls.iter().any(|c| ctx.kind_of(c) == Some(SignatureKind::Bridge));
        let too_few = is_bridge_operation && verifications.len() < ctx.config.min_verification_calls;
        if weak_proof || too_few {
            patterns.push("insufficient_validation");
            evidence.verification_calls = Some(verifications.len());
        }

        let replayed = aux.previously_executed.unwrap_or(false)
            || matches!(
                (aux.original_chain_id, ctx.tx.chain_id),
                (Some(original), Some(current)) if original != current
            );
        if replayed {
            patterns.push("replay");
        }

        if let (Some(original), Some(altered)) = (&aux.original_message, &aux.altered_message) {
            if !same_payload(original, altered) {
                patterns.push("message_tampering");
            }
        }

        if let (Some(source), Some(destination)) = (aux.source_chain_price, aux.destination_chain_price) {
            if source > 0.0 {
                let deviation = (destination - source).abs() / source;
                if deviation > ctx.config.price_deviation_ratio {
                    patterns.push("price_inconsistency");
                    evidence.price_deviation = Some(deviation);
                }
            }
        }

        let locked = aux.source_locked_amount.as_deref().and_then(parse_quantity);
        let minted = aux.destination_minted_amount.as_deref().and_then(parse_quantity);
        if let (Some(locked), Some(minted)) = (locked, minted) {
            if locked != minted {
                patterns.push("supply_mismatch");
                evidence.locked_amount = Some(locked.to_string());
                evidence.minted_amount = Some(minted.to_string());
            }
        }

        if patterns.is_empty() {
            return None;
        }

        evidence.suspicious_patterns = patterns.iter().map(|p| p.to_string()).collect();
        Some(
            Finding::new(
                format!("Potential cross-chain attack: {}", patterns.join(", ")),
                Evidence::CrossChainAttack(evidence),
            )
            .with_classification(patterns[0]),
        )
    }
}

/// Payloads hexadecimais são comparados pelos bytes; os demais, literalmente
fn same_payload(original: &str, altered: &str) -> bool {
    match (decode_hex(original), decode_hex(altered)) {
        (Some(a), Some(b)) => a == b,
        _ => original.trim() == altered.trim(),
    }
}
