use super::{EvaluationContext, Evidence, Finding, RuleEvaluator};
use crate::signatures::SignatureKind;
use crate::trace::word_to_address;
use ethernity_core::types::RuleKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipTransfer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_owner: Option<String>,
    pub new_owner_blacklisted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhishingEvidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_target: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub approval_target_blacklisted: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ownership_transfers: Vec<OwnershipTransfer>,
}

/// Detector de phishing: seletores de drainers, approvals ilimitados e
/// transferências de ownership
#[derive(Debug, Default)]
pub struct PhishingDetector;

impl PhishingDetector {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for PhishingDetector {
    fn kind(&self) -> RuleKind {
        RuleKind::Phishing
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding> {
        let call = ctx.tx.trace.as_call();
        let mut reasons = Vec::new();
        let mut classification = None;
        let mut evidence = PhishingEvidence {
            selector: call.selector().map(|s| s.to_hex()),
            matched_signature: None,
            approval_target: None,
            approval_target_blacklisted: false,
            ownership_transfers: Vec::new(),
        };

        match ctx.kind_of(&call) {
            Some(SignatureKind::Phishing) => {
                let signature = ctx.signature_of(&call);
                reasons.push(format!(
                    "call matches known drainer signature {}",
                    signature.as_deref().unwrap_or("unknown")
                ));
                evidence.matched_signature = signature;
                classification.get_or_insert("drainer_signature");
            }
            Some(SignatureKind::Approve) => {
                let args = call.input_digits().get(8..).unwrap_or("");
                if longest_run(args, 'f') >= ctx.config.max_allowance_run {
                    let target = call.abi_address(0);
                    let blacklisted = target
                        .as_deref()
                        .map(|t| ctx.config.is_blacklisted(t))
                        .unwrap_or(false);
                    let shown = target.as_deref().unwrap_or("unknown spender");
                    if blacklisted {
                        reasons.push(format!("unlimited approval granted to blacklisted address {}", shown));
                    } else {
                        reasons.push(format!("unlimited token approval granted to {}", shown));
                    }
                    evidence.matched_signature = ctx.signature_of(&call);
                    evidence.approval_target = target;
                    evidence.approval_target_blacklisted = blacklisted;
                    classification.get_or_insert("unlimited_approval");
                }
            }
            _ => {}
        }

        let ownership_topic = ctx.registry.ownership_transferred_topic();
        for log in &ctx.tx.trace.logs {
            if !log.topics.iter().any(|t| t.trim().eq_ignore_ascii_case(ownership_topic)) {
                continue;
            }
            let new_owner = log.topics.get(2).and_then(|t| word_to_address(t.trim()));
            let blacklisted = new_owner
                .as_deref()
                .map(|o| ctx.config.is_blacklisted(o))
                .unwrap_or(false);
            let shown = new_owner.as_deref().unwrap_or("unknown owner");
            if blacklisted {
                reasons.push(format!("ownership transferred to blacklisted address {}", shown));
            } else {
                reasons.push(format!("contract ownership transferred to {}", shown));
            }
            evidence.ownership_transfers.push(OwnershipTransfer {
                contract: log.address.clone(),
                new_owner,
                new_owner_blacklisted: blacklisted,
            });
            classification.get_or_insert("ownership_transfer");
        }

        if reasons.is_empty() {
            return None;
        }

        let mut finding = Finding::new(
            format!("Potential phishing: {}", reasons.join(", ")),
            Evidence::Phishing(evidence),
        );
        if let Some(tag) = classification {
            finding = finding.with_classification(tag);
        }
        Some(finding)
    }
}

/// Maior sequência consecutiva de `target` (sem diferenciar maiúsculas)
fn longest_run(digits: &str, target: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in digits.chars() {
        if c.eq_ignore_ascii_case(&target) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
