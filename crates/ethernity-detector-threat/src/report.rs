/*!
 * Ethernity Threat Detector - Report
 *
 * Resultado agregado de uma avaliação
 */

use ethernity_core::types::RuleKind;
use ethernity_core::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::detectors::{Evidence, Finding};
use crate::trace::Transaction;

/// Mensagem quando nenhuma regra dispara
pub const NO_THREATS_MESSAGE: &str = "No threats detected";

/// Separador entre mensagens de regras
pub const MESSAGE_DELIMITER: &str = "; ";

/// Detalhes de uma regra que disparou
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDetails {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(flatten)]
    pub evidence: Evidence,
}

impl From<Finding> for RuleDetails {
    fn from(finding: Finding) -> Self {
        Self {
            message: finding.message,
            classification: finding.classification,
            evidence: finding.evidence,
        }
    }
}

/// Relatório de detecção
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_name: Option<String>,
    pub detected: bool,
    pub message: String,
    pub findings: BTreeMap<RuleKind, RuleDetails>,
}

impl DetectionReport {
    /// Monta o relatório a partir dos findings, na ordem de execução
    pub fn from_findings(tx: &Transaction, findings: Vec<Finding>) -> Self {
        let messages: Vec<String> = findings.iter().map(|f| f.message.clone()).collect();
        let findings: BTreeMap<RuleKind, RuleDetails> =
            findings.into_iter().map(|f| (f.kind(), RuleDetails::from(f))).collect();

        let message = if messages.is_empty() {
            NO_THREATS_MESSAGE.to_string()
        } else {
            messages.join(MESSAGE_DELIMITER)
        };

        Self {
            tx_hash: tx.trace.hash.clone().or_else(|| tx.id.clone()),
            chain_id: tx.chain_id,
            protocol_address: tx.protocol_address.clone(),
            protocol_name: tx.protocol_name.clone(),
            detected: !findings.is_empty(),
            message,
            findings,
        }
    }

    /// Regras que dispararam, na ordem de execução
    pub fn fired_rules(&self) -> Vec<RuleKind> {
        self.findings.keys().copied().collect()
    }

    pub fn has_finding(&self, kind: RuleKind) -> bool {
        self.findings.contains_key(&kind)
    }

    pub fn details(&self, kind: RuleKind) -> Option<&RuleDetails> {
        self.findings.get(&kind)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Other(format!("Falha ao serializar relatório: {}", e)))
    }
}
