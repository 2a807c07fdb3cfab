/*!
 * Ethernity Threat Detector
 *
 * Detecção heurística de ameaças em uma única transação EVM a partir do seu
 * call trace, logs e snapshots de estado. Cada regra é um avaliador
 * independente; o engine executa todas e agrega o resultado em um relatório.
 */

pub mod config;
pub mod detectors;
pub mod engine;
pub mod graph;
pub mod legitimacy;
pub mod report;
pub mod signatures;
pub mod trace;

// Re-exportações públicas
pub use config::DetectionConfig;
pub use detectors::{default_evaluators, EvaluationContext, Evidence, Finding, RuleEvaluator};
pub use engine::ThreatEngine;
pub use graph::{CallEdge, CallGraph, CyclePath};
pub use legitimacy::{LegitimacyOverride, LegitimacyReason};
pub use report::{DetectionReport, RuleDetails, NO_THREATS_MESSAGE};
pub use signatures::{GovernanceAction, Selector, SignatureKind, SignatureRegistry};
pub use trace::{AuxiliaryContext, CallRecord, Log, Trace, Transaction};

pub use ethernity_core::{Error, Result, RuleKind, Severity};
