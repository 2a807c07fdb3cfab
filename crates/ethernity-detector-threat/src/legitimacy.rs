/*!
 * Ethernity Threat Detector - Legitimacy
 *
 * Pré-filtro que reconhece transações legítimas a partir da configuração e
 * do contexto auxiliar, antes das regras sensíveis a falsos positivos.
 */

use ethernity_core::utils::meets_ratio_bps;
use serde::Serialize;
use std::fmt;

use crate::config::DetectionConfig;
use crate::signatures::{SignatureKind, SignatureRegistry};
use crate::trace::{CallRecord, Transaction};

/// Motivo pelo qual uma transação foi considerada legítima
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegitimacyReason {
    TrustedSender,
    VerifiedSender,
    RepaidFlashLoan,
    MultisigQuorum,
    ValidatorQuorum,
    BridgeWithChainContext,
    VerifiedProtocol,
}

impl fmt::Display for LegitimacyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LegitimacyReason::TrustedSender => "trusted_sender",
            LegitimacyReason::VerifiedSender => "verified_sender",
            LegitimacyReason::RepaidFlashLoan => "repaid_flash_loan",
            LegitimacyReason::MultisigQuorum => "multisig_quorum",
            LegitimacyReason::ValidatorQuorum => "validator_quorum",
            LegitimacyReason::BridgeWithChainContext => "bridge_with_chain_context",
            LegitimacyReason::VerifiedProtocol => "verified_protocol",
        };
        f.write_str(name)
    }
}

/// Avalia a legitimidade de uma transação
pub struct LegitimacyOverride<'a> {
    config: &'a DetectionConfig,
    registry: &'a SignatureRegistry,
}

impl<'a> LegitimacyOverride<'a> {
    pub fn new(config: &'a DetectionConfig, registry: &'a SignatureRegistry) -> Self {
        Self { config, registry }
    }

    /// Primeiro motivo de legitimidade encontrado, na ordem de verificação
    pub fn assess(&self, tx: &Transaction) -> Option<LegitimacyReason> {
        let aux = &tx.context;
        let trace = &tx.trace;

        if self.config.is_trusted_sender(&trace.from) {
            return Some(LegitimacyReason::TrustedSender);
        }
        if aux.verified_sender.unwrap_or(false) {
            return Some(LegitimacyReason::VerifiedSender);
        }
        if self.has_repaid_flash_loan(&trace.calls) {
            return Some(LegitimacyReason::RepaidFlashLoan);
        }
        if quorum_reached(aux.signatures_provided, aux.signatures_required) {
            return Some(LegitimacyReason::MultisigQuorum);
        }
        if quorum_reached(aux.validators_confirmed, aux.validators_required) {
            return Some(LegitimacyReason::ValidatorQuorum);
        }

        let recipient = trace.recipient();
        let is_bridge = recipient.contains("bridge") || self.config.is_bridge_address(&recipient);
        if is_bridge && aux.has_chain_context() {
            return Some(LegitimacyReason::BridgeWithChainContext);
        }

        if aux.verified_protocol.unwrap_or(false) || aux.pre_verified_contracts.unwrap_or(false) {
            return Some(LegitimacyReason::VerifiedProtocol);
        }

        None
    }

    pub fn is_legitimate(&self, tx: &Transaction) -> bool {
        self.assess(tx).is_some()
    }

    /// Flash loan seguido imediatamente de devolução ao mesmo provedor
    fn has_repaid_flash_loan(&self, calls: &[CallRecord]) -> bool {
        calls.windows(2).any(|pair| {
            let (loan, repayment) = (&pair[0], &pair[1]);
            if self.registry.classify(loan.input.as_deref()) != Some(SignatureKind::FlashLoan) {
                return false;
            }
            let principal = loan.value_or_zero();
            let provider = loan.to_address();
            !principal.is_zero()
                && provider.is_some()
                && repayment.to_address() == provider
                && meets_ratio_bps(
                    repayment.value_or_zero(),
                    principal,
                    self.config.flash_loan_repay_ratio_bps,
                )
        })
    }
}

fn quorum_reached(provided: Option<u64>, required: Option<u64>) -> bool {
    matches!((provided, required), (Some(provided), Some(required)) if provided >= required)
}
