use ethernity_core::types::RuleKind;
use serde::Serialize;

use crate::config::DetectionConfig;
use crate::legitimacy::LegitimacyReason;
use crate::signatures::{SignatureKind, SignatureRegistry};
use crate::trace::{collect_calls, CallRecord, Transaction};

pub mod spoofing;
pub mod phishing;
pub mod poisoning;
pub mod reentrancy;
pub mod frontrunning;
pub mod abnormal_value;
pub mod flash_loan;
pub mod honeypot;
pub mod governance;
pub mod oracle_manipulation;
pub mod cross_chain;

pub use spoofing::{SpoofingDetector, SpoofingEvidence};
pub use phishing::{PhishingDetector, PhishingEvidence};
pub use poisoning::{PoisoningDetector, PoisoningEvidence};
pub use reentrancy::{ReentrancyDetector, ReentrancyEvidence};
pub use frontrunning::{FrontRunningDetector, FrontRunningEvidence};
pub use abnormal_value::{AbnormalValueDetector, AbnormalValueEvidence};
pub use flash_loan::{FlashLoanDetector, FlashLoanEvidence};
pub use honeypot::{HoneypotDetector, HoneypotEvidence};
pub use governance::{GovernanceAttackDetector, GovernanceEvidence};
pub use oracle_manipulation::{OracleManipulationDetector, OracleEvidence};
pub use cross_chain::{CrossChainAttackDetector, CrossChainEvidence};

/// Avaliador de uma regra heurística
///
/// Avaliadores são funções puras da transação e do contexto: não guardam
/// estado entre chamadas e não falham.
pub trait RuleEvaluator: Send + Sync {
    fn kind(&self) -> RuleKind;

    /// Retorna `Some` apenas quando a regra dispara
    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<Finding>;
}

/// Tudo que um avaliador pode consultar durante uma avaliação
pub struct EvaluationContext<'a> {
    pub tx: &'a Transaction,
    pub config: &'a DetectionConfig,
    pub registry: &'a SignatureRegistry,
    /// Resultado do pré-filtro de legitimidade
    pub legitimacy: Option<LegitimacyReason>,
}

impl<'a> EvaluationContext<'a> {
    pub fn kind_of(&self, call: &CallRecord) -> Option<SignatureKind> {
        self.registry.classify(call.input.as_deref())
    }

    /// Assinatura canônica do seletor de uma chamada, se conhecida
    pub fn signature_of(&self, call: &CallRecord) -> Option<String> {
        let selector = call.selector()?;
        self.registry.lookup(&selector).map(|known| known.signature.clone())
    }

    /// Subchamadas do trace em pré-ordem, até a profundidade configurada
    pub fn nested_calls(&self) -> Vec<&'a CallRecord> {
        collect_calls(&self.tx.trace.calls, self.config.max_walk_depth)
    }

    pub fn is_legitimate(&self) -> bool {
        self.legitimacy.is_some()
    }
}

/// Resultado de uma regra que disparou
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    pub evidence: Evidence,
}

impl Finding {
    pub fn new(message: impl Into<String>, evidence: Evidence) -> Self {
        Self {
            message: message.into(),
            classification: None,
            evidence,
        }
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.evidence.kind()
    }
}

/// Evidência específica de cada regra
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    Spoofing(SpoofingEvidence),
    Phishing(PhishingEvidence),
    Poisoning(PoisoningEvidence),
    Reentrancy(ReentrancyEvidence),
    FrontRunning(FrontRunningEvidence),
    AbnormalValue(AbnormalValueEvidence),
    FlashLoan(FlashLoanEvidence),
    Honeypot(HoneypotEvidence),
    GovernanceAttack(GovernanceEvidence),
    OracleManipulation(OracleEvidence),
    CrossChainAttack(CrossChainEvidence),
}

impl Evidence {
    pub fn kind(&self) -> RuleKind {
        match self {
            Evidence::Spoofing(_) => RuleKind::Spoofing,
            Evidence::Phishing(_) => RuleKind::Phishing,
            Evidence::Poisoning(_) => RuleKind::Poisoning,
            Evidence::Reentrancy(_) => RuleKind::Reentrancy,
            Evidence::FrontRunning(_) => RuleKind::FrontRunning,
            Evidence::AbnormalValue(_) => RuleKind::AbnormalValue,
            Evidence::FlashLoan(_) => RuleKind::FlashLoan,
            Evidence::Honeypot(_) => RuleKind::Honeypot,
            Evidence::GovernanceAttack(_) => RuleKind::GovernanceAttack,
            Evidence::OracleManipulation(_) => RuleKind::OracleManipulation,
            Evidence::CrossChainAttack(_) => RuleKind::CrossChainAttack,
        }
    }
}

/// Avaliadores padrão, na ordem fixa de execução
pub fn default_evaluators() -> Vec<Box<dyn RuleEvaluator>> {
    vec![
        Box::new(SpoofingDetector::new()),
        Box::new(PhishingDetector::new()),
        Box::new(PoisoningDetector::new()),
        Box::new(ReentrancyDetector::new()),
        Box::new(FrontRunningDetector::new()),
        Box::new(AbnormalValueDetector::new()),
        Box::new(FlashLoanDetector::new()),
        Box::new(HoneypotDetector::new()),
        Box::new(GovernanceAttackDetector::new()),
        Box::new(OracleManipulationDetector::new()),
        Box::new(CrossChainAttackDetector::new()),
    ]
}
