use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use ethernity_core::types::RuleKind;
use ethernity_core::utils::strip_0x;
use serde::Serialize;
use std::collections::BTreeMap;

/// Padrão suspeito no hash da transação
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum HashPattern {
    RepeatedCharacter { character: char, occurrences: usize },
    AscendingRun { length: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpoofingEvidence {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blacklisted_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_similarity: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hash_patterns: Vec<HashPattern>,
}

/// Detector de spoofing: endereços em blacklist, endereços parecidos e
/// hashes com padrões artificiais
#[derive(Debug, Default)]
pub struct SpoofingDetector;

impl SpoofingDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for SpoofingDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::Spoofing
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let trace = &ctx.tx.trace;
        let sender = trace.sender();
        let recipient = trace.recipient();
        let mut reasons = Vec::new();

        let mut blacklisted = Vec::new();
        for address in [&sender, &recipient] {
            if ctx.config.is_blacklisted(address) && !blacklisted.contains(address) {
                blacklisted.push(address.clone());
            }
        }
        if !blacklisted.is_empty() {
            reasons.push(format!("blacklisted address involved ({})", blacklisted.join(", ")));
        }

        let similarity = address_similarity(&sender, &recipient);
        let lookalike = similarity > ctx.config.similarity_threshold && similarity < 1.0;
        if lookalike {
            reasons.push(format!(
                "sender and recipient addresses look alike (similarity {:.3})",
                similarity
            ));
        }

        let hash_patterns = trace
            .hash
            .as_deref()
            .map(|hash| {
                suspicious_hash_patterns(
                    hash,
                    ctx.config.hash_max_char_repeats,
                    ctx.config.hash_ascending_run,
                )
            })
            .unwrap_or_default();
        if !hash_patterns.is_empty() {
            reasons.push("transaction hash has an artificial pattern".to_string());
        }

        if reasons.is_empty() {
            return None;
        }

        let evidence = SpoofingEvidence {
            blacklisted_addresses: blacklisted,
            address_similarity: lookalike.then_some(similarity),
            hash_patterns,
        };

        Some(Finding::new(
            format!("Potential spoofing: {}", reasons.join(", ")),
            Evidence::Spoofing(evidence),
        ))
    }
}

/// Fração de posições iguais entre dois endereços (sem `0x`, sem diferenciar
/// maiúsculas), sobre o comprimento do maior
pub fn address_similarity(a: &str, b: &str) -> f64 {
    let a = strip_0x(a.trim()).to_ascii_lowercase();
    let b = strip_0x(b.trim()).to_ascii_lowercase();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }

    let matching = a.bytes().zip(b.bytes()).filter(|(x, y)| x == y).count();
    matching as f64 / longest as f64
}

/// Caracteres repetidos demais e sequências ascendentes longas no hash
pub fn suspicious_hash_patterns(hash: &str, max_repeats: usize, ascending_run: usize) -> Vec<HashPattern> {
    let digits: Vec<char> = strip_0x(hash.trim()).to_ascii_lowercase().chars().collect();
    let mut patterns = Vec::new();

    let mut occurrences: BTreeMap<char, usize> = BTreeMap::new();
    for &c in &digits {
        *occurrences.entry(c).or_insert(0) += 1;
    }
    for (character, count) in occurrences {
        if count > max_repeats {
            patterns.push(HashPattern::RepeatedCharacter {
                character,
                occurrences: count,
            });
        }
    }

    let mut longest = if digits.is_empty() { 0 } else { 1 };
    let mut current = longest;
    for pair in digits.windows(2) {
        if pair[1] as u32 == pair[0] as u32 + 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    if ascending_run > 0 && longest >= ascending_run {
        patterns.push(HashPattern::AscendingRun { length: longest });
    }

    patterns
}
