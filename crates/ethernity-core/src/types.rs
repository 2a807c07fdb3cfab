/*!
 * Ethernity Types
 *
 * Tipos comuns usados em toda a workspace Ethernity
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tipo de regra de detecção
///
/// A ordem das variantes é a ordem fixa de execução dos avaliadores e também
/// a ordem das chaves no relatório final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Spoofing,
    Phishing,
    Poisoning,
    Reentrancy,
    FrontRunning,
    AbnormalValue,
    FlashLoan,
    Honeypot,
    GovernanceAttack,
    OracleManipulation,
    CrossChainAttack,
}

impl RuleKind {
    /// Todas as regras, na ordem de execução
    pub const ALL: [RuleKind; 11] = [
        RuleKind::Spoofing,
        RuleKind::Phishing,
        RuleKind::Poisoning,
        RuleKind::Reentrancy,
        RuleKind::FrontRunning,
        RuleKind::AbnormalValue,
        RuleKind::FlashLoan,
        RuleKind::Honeypot,
        RuleKind::GovernanceAttack,
        RuleKind::OracleManipulation,
        RuleKind::CrossChainAttack,
    ];

    /// Nome da regra como aparece no relatório
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Spoofing => "spoofing",
            RuleKind::Phishing => "phishing",
            RuleKind::Poisoning => "poisoning",
            RuleKind::Reentrancy => "reentrancy",
            RuleKind::FrontRunning => "frontRunning",
            RuleKind::AbnormalValue => "abnormalValue",
            RuleKind::FlashLoan => "flashLoan",
            RuleKind::Honeypot => "honeypot",
            RuleKind::GovernanceAttack => "governanceAttack",
            RuleKind::OracleManipulation => "oracleManipulation",
            RuleKind::CrossChainAttack => "crossChainAttack",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severidade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}
