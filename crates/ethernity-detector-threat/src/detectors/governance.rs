use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::{GovernanceAction, SignatureKind};
use crate::trace::{collect_calls, walk_calls, CallRecord};
use ethereum_types::U256;
use ethernity_core::types::RuleKind;
use ethernity_core::utils::format_ether;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernanceEvidence {
    pub suspicious_patterns: Vec<String>,
    pub governance_actions: Vec<GovernanceAction>,
    /// Maior valor drenado por um `execute` (wei)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drained_amount: Option<String>,
}

/// Detector de ataques de governança
///
/// Reconhece quatro formatos: flash loan junto de governança, drenagem de
/// tesouraria via `execute`, compra de votos e bypass de timelock.
#[derive(Debug, Default)]
pub struct GovernanceAttackDetector;

impl GovernanceAttackDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for GovernanceAttackDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::GovernanceAttack
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        // A chamada de nível superior também conta como ação de governança
        let root = ctx.tx.trace.root_call();
        let calls = collect_calls(std::slice::from_ref(&root), ctx.config.max_walk_depth.saturating_add(1));
        let classified: Vec<(&CallRecord, Option<SignatureKind>)> =
            calls.into_iter().map(|c| (c, ctx.kind_of(c))).collect();

        let mut governance_actions = Vec::new();
        for (_, kind) in &classified {
            if let Some(SignatureKind::Governance(action)) = kind {
                if !governance_actions.contains(action) {
                    governance_actions.push(*action);
                }
            }
        }
        if governance_actions.is_empty() {
            return None;
        }

        let has_kind = |wanted: SignatureKind| classified.iter().any(|(_, kind)| *kind == Some(wanted));
        let mut patterns = Vec::new();

        if has_kind(SignatureKind::FlashLoan) {
            patterns.push("flash_loan_governance");
        }

        let drained = classified
            .iter()
            .filter(|(_, kind)| *kind == Some(SignatureKind::Governance(GovernanceAction::Execute)))
            .filter_map(|(call, _)| largest_transfer(ctx, call))
            .max()
            .filter(|amount| *amount > ctx.config.treasury_drain_threshold);
        if drained.is_some() {
            patterns.push("treasury_drain");
        }

        let transfers = classified
            .iter()
            .filter(|(_, kind)| kind.map(|k| k.is_transfer()).unwrap_or(false))
            .count();
        if transfers >= ctx.config.vote_buying_min_transfers {
            patterns.push("vote_buying");
        }

        if has_kind(SignatureKind::TimeManipulation) {
            patterns.push("timelock_bypass");
        }

        if patterns.is_empty() {
            return None;
        }

        let mut message = format!("Potential governance attack: {}", patterns.join(", "));
        if let Some(amount) = drained {
            message.push_str(&format!(" ({} moved by execute)", format_ether(&amount)));
        }

        let classification = patterns[0];
        let evidence = GovernanceEvidence {
            suspicious_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            governance_actions,
            drained_amount: drained.map(|a| a.to_string()),
        };
        Some(Finding::new(message, Evidence::GovernanceAttack(evidence)).with_classification(classification))
    }
}

/// Maior transferência realizada em qualquer profundidade abaixo de `execute`
///
/// Conta tanto o valor nativo quanto o montante decodificado de
/// `transfer`/`transferFrom`.
fn largest_transfer(ctx: &EvaluationContext<'_>, execute: &CallRecord) -> Option<U256> {
    let mut largest: Option<U256> = None;
    walk_calls(&execute.calls, ctx.config.max_walk_depth, |_, call| {
        let token_amount = match ctx.kind_of(call) {
            Some(SignatureKind::Transfer) => call.abi_uint(1),
            Some(SignatureKind::TransferFrom) => call.abi_uint(2),
            _ => None,
        };
        let amount = call.value_or_zero().max(token_amount.unwrap_or_default());
        if !amount.is_zero() && largest.map(|l| amount > l).unwrap_or(true) {
            largest = Some(amount);
        }
    });
    largest
}
