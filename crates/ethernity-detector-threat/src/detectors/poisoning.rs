use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::SignatureKind;
use crate::trace::{AccountState, StateSnapshot};
use ethernity_core::types::RuleKind;
use ethernity_core::utils::{normalize_address, parse_quantity};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Diferença entre os estados `pre` e `post`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Entradas no formato `endereço:balance`, `endereço:nonce` ou `endereço:storage:slot`
    pub changed: Vec<String>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Padrão suspeito na lista de chamadas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum CallPattern {
    ExcessiveCalls { count: usize, limit: usize },
    RepeatedTarget { target: String, count: usize },
    OutputAmplification { call_index: usize, input_bytes: usize, output_bytes: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoisoningEvidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_changes: Option<StateDiff>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suspicious_patterns: Vec<CallPattern>,
}

/// Detector de poisoning: assinaturas conhecidas, mutações de estado e
/// padrões anômalos na lista de chamadas
#[derive(Debug, Default)]
pub struct PoisoningDetector;

impl PoisoningDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for PoisoningDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::Poisoning
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let trace = &ctx.tx.trace;
        let mut reasons = Vec::new();

        let root = trace.as_call();
        let matched_signature = match ctx.kind_of(&root) {
            Some(SignatureKind::Poisoning) => {
                let signature = ctx.signature_of(&root);
                reasons.push(format!(
                    "call matches known poisoning signature {}",
                    signature.as_deref().unwrap_or("unknown")
                ));
                signature
            }
            _ => None,
        };

        let state_changes = match (&trace.pre, &trace.post) {
            (Some(pre), Some(post)) => Some(diff_states(pre, post)).filter(|d| !d.is_empty()),
            _ => None,
        };
        if let Some(diff) = &state_changes {
            reasons.push(format!(
                "unexpected state mutation ({} added, {} removed, {} changed)",
                diff.added.len(),
                diff.removed.len(),
                diff.changed.len()
            ));
        }

        let suspicious_patterns = call_patterns(ctx);
        if !suspicious_patterns.is_empty() {
            reasons.push(format!("{} suspicious call pattern(s)", suspicious_patterns.len()));
        }

        if reasons.is_empty() {
            return None;
        }

        let evidence = PoisoningEvidence {
            matched_signature,
            state_changes,
            suspicious_patterns,
        };
        Some(Finding::new(
            format!("Potential poisoning: {}", reasons.join(", ")),
            Evidence::Poisoning(evidence),
        ))
    }
}

fn call_patterns(ctx: &EvaluationContext<'_>) -> Vec<CallPattern> {
    let calls = &ctx.tx.trace.calls;
    let mut patterns = Vec::new();

    if calls.len() > ctx.config.max_call_count {
        patterns.push(CallPattern::ExcessiveCalls {
            count: calls.len(),
            limit: ctx.config.max_call_count,
        });
    }

    let mut per_target: BTreeMap<String, usize> = BTreeMap::new();
    for call in calls {
        if let Some(to) = call.to_address() {
            *per_target.entry(to).or_insert(0) += 1;
        }
    }
    for (target, count) in per_target {
        if count > ctx.config.max_calls_per_target {
            patterns.push(CallPattern::RepeatedTarget { target, count });
        }
    }

    for (index, call) in calls.iter().enumerate() {
        let input_bytes = call.input_digits().len() / 2;
        let output_bytes = call.output_digits().len() / 2;
        if input_bytes > 0 && output_bytes > input_bytes.saturating_mul(ctx.config.output_input_ratio) {
            patterns.push(CallPattern::OutputAmplification {
                call_index: index,
                input_bytes,
                output_bytes,
            });
        }
    }

    patterns
}

/// Compara dois snapshots de estado, endereço a endereço
pub fn diff_states(pre: &StateSnapshot, post: &StateSnapshot) -> StateDiff {
    let pre: BTreeMap<String, &AccountState> =
        pre.iter().map(|(a, s)| (normalize_address(a), s)).collect();
    let post: BTreeMap<String, &AccountState> =
        post.iter().map(|(a, s)| (normalize_address(a), s)).collect();

    let mut diff = StateDiff::default();

    for (address, before) in &pre {
        let Some(after) = post.get(address) else {
            diff.removed.push(address.clone());
            continue;
        };

        if !same_quantity(before.balance.as_deref(), after.balance.as_deref()) {
            diff.changed.push(format!("{}:balance", address));
        }
        if !same_quantity(before.nonce.as_deref(), after.nonce.as_deref()) {
            diff.changed.push(format!("{}:nonce", address));
        }

        let slots: BTreeSet<&String> = before.storage.keys().chain(after.storage.keys()).collect();
        for slot in slots {
            let old = before.storage.get(slot).map(String::as_str);
            let new = after.storage.get(slot).map(String::as_str);
            if !same_quantity(old, new) {
                diff.changed.push(format!("{}:storage:{}", address, slot));
            }
        }
    }

    for address in post.keys() {
        if !pre.contains_key(address) {
            diff.added.push(address.clone());
        }
    }

    diff
}

/// Compara quantidades numericamente quando possível, textualmente caso contrário
fn same_quantity(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (parse_quantity(a), parse_quantity(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a.trim().eq_ignore_ascii_case(b.trim()),
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: &str, slots: &[(&str, &str)]) -> AccountState {
        AccountState {
            balance: Some(balance.to_string()),
            nonce: Some("1".to_string()),
            storage: slots.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn identical_snapshots_have_no_diff() {
        let mut pre = StateSnapshot::new();
        pre.insert("0xAA".to_string(), account("0x10", &[("0x0", "0x1")]));
        let mut post = StateSnapshot::new();
        post.insert("0xaa".to_string(), account("16", &[("0x0", "0x01")]));
        assert!(diff_states(&pre, &post).is_empty());
    }

    #[test]
    fn reports_added_removed_and_changed() {
        let mut pre = StateSnapshot::new();
        pre.insert("0xaa".to_string(), account("1", &[("0x0", "0x1")]));
        pre.insert("0xbb".to_string(), account("1", &[]));
        let mut post = StateSnapshot::new();
        post.insert("0xaa".to_string(), account("2", &[("0x0", "0x2")]));
        post.insert("0xcc".to_string(), account("1", &[]));

        let diff = diff_states(&pre, &post);
        assert_eq!(diff.added, vec!["0xcc"]);
        assert_eq!(diff.removed, vec!["0xbb"]);
        assert_eq!(diff.changed, vec!["0xaa:balance", "0xaa:storage:0x0"]);
    }
}
