use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::graph::{cycle_members, CallGraph, CyclePath};
use crate::signatures::SignatureKind;
use crate::trace::CallRecord;
use ethernity_core::types::{RuleKind, Severity};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Padrão auxiliar encontrado junto de um ciclo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReentrancyPattern {
    pub pattern: String,
    pub severity: Severity,
    pub description: String,
}

impl ReentrancyPattern {
    fn new(pattern: &str, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            severity,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReentrancyEvidence {
    pub paths: Vec<CyclePath>,
    pub patterns: Vec<ReentrancyPattern>,
}

/// Detector de reentrância baseado em ciclos no grafo de chamadas
#[derive(Debug, Default)]
pub struct ReentrancyDetector;

impl ReentrancyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for ReentrancyDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::Reentrancy
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        if ctx.is_legitimate() || ctx.tx.context.is_known_false_positive() {
            debug!("reentrancy ignorada: transação legítima ou falso positivo conhecido");
            return None;
        }

        let calls = &ctx.tx.trace.calls;
        let graph = CallGraph::build(calls, ctx.registry);
        let cycles = graph.find_cycles(ctx.config.max_search_depth);
        if cycles.is_empty() {
            return None;
        }

        let mut patterns = Vec::new();

        if let Some((prior, next)) = write_after_call(ctx, calls, &cycles) {
            patterns.push(ReentrancyPattern::new(
                "write_after_call",
                Severity::High,
                format!("state-changing call #{} follows value-bearing call #{} inside a cycle", next, prior),
            ));
        }

        let withdrawals = calls
            .iter()
            .filter(|c| ctx.kind_of(c) == Some(SignatureKind::Withdraw))
            .count();
        if withdrawals > 1 {
            patterns.push(ReentrancyPattern::new(
                "multiple_withdrawals",
                Severity::Medium,
                format!("{} withdraw calls in the same transaction", withdrawals),
            ));
        }

        if let Some(count) = nested_value_transfers(calls, &cycles) {
            patterns.push(ReentrancyPattern::new(
                "nested_value_transfers",
                Severity::Medium,
                format!("{} value transfers between members of one cycle", count),
            ));
        }

        if patterns.is_empty() {
            patterns.push(ReentrancyPattern::new(
                "callback_cycle",
                Severity::Low,
                "call graph contains a callback cycle",
            ));
        }

        // Ordena do mais grave para o menos grave, estável na ordem de inserção
        patterns.sort_by(|a, b| b.severity.cmp(&a.severity));
        let classification = patterns[0].pattern.clone();

        let message = format!(
            "Potential reentrancy: {} callback cycle(s) in call graph ({})",
            cycles.len(),
            patterns.iter().map(|p| p.pattern.as_str()).collect::<Vec<_>>().join(", ")
        );

        let evidence = ReentrancyEvidence {
            paths: cycles.into_iter().collect(),
            patterns,
        };
        Some(Finding::new(message, Evidence::Reentrancy(evidence)).with_classification(classification))
    }
}

fn within_cycle(call: &CallRecord, members: &BTreeSet<&str>) -> bool {
    match (call.from_address(), call.to_address()) {
        (Some(from), Some(to)) => members.contains(from.as_str()) && members.contains(to.as_str()),
        _ => false,
    }
}

/// Primeiro par (anterior, seguinte) em que uma chamada com valor é seguida
/// imediatamente por uma escrita, ambas dentro do mesmo ciclo
fn write_after_call(
    ctx: &EvaluationContext<'_>,
    calls: &[CallRecord],
    cycles: &BTreeSet<CyclePath>,
) -> Option<(usize, usize)> {
    for cycle in cycles {
        let members = cycle_members(cycle);
        for (index, pair) in calls.windows(2).enumerate() {
            let (prior, next) = (&pair[0], &pair[1]);
            if !prior.has_positive_value() || !within_cycle(prior, &members) || !within_cycle(next, &members) {
                continue;
            }
            if ctx.kind_of(next).map(|k| k.is_state_changing()).unwrap_or(false) {
                return Some((index, index + 1));
            }
        }
    }
    None
}

/// Maior número de transferências de valor entre membros de um único ciclo,
/// quando maior que um
fn nested_value_transfers(calls: &[CallRecord], cycles: &BTreeSet<CyclePath>) -> Option<usize> {
    cycles
        .iter()
        .map(|cycle| {
            let members = cycle_members(cycle);
            calls
                .iter()
                .filter(|c| c.has_positive_value() && within_cycle(c, &members))
                .count()
        })
        .filter(|&count| count > 1)
        .max()
}
