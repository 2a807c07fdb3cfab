/*!
 * Ethernity Threat Detector - Engine
 *
 * Executa todos os avaliadores sobre uma transação e agrega os resultados
 */

use ethernity_core::types::RuleKind;
use ethernity_core::Result;
use tracing::{debug, info, warn};

use crate::config::DetectionConfig;
use crate::detectors::{default_evaluators, EvaluationContext, RuleEvaluator};
use crate::legitimacy::LegitimacyOverride;
use crate::report::DetectionReport;
use crate::signatures::SignatureRegistry;
use crate::trace::Transaction;

/// Engine de detecção de ameaças
///
/// Configuração e registro de assinaturas são fixados na construção e apenas
/// lidos depois disso; uma mesma instância pode ser compartilhada entre threads.
pub struct ThreatEngine {
    config: DetectionConfig,
    registry: SignatureRegistry,
    evaluators: Vec<Box<dyn RuleEvaluator>>,
}

impl ThreatEngine {
    /// Cria um engine com os avaliadores padrão
    pub fn new(config: DetectionConfig, registry: SignatureRegistry) -> Self {
        Self {
            config,
            registry,
            evaluators: default_evaluators(),
        }
    }

    /// Cria um engine com a configuração informada e as assinaturas padrão
    pub fn with_config(config: DetectionConfig) -> Self {
        Self::new(config, SignatureRegistry::default())
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    /// Regras executadas, na ordem de execução
    pub fn available_rules(&self) -> Vec<RuleKind> {
        self.evaluators.iter().map(|e| e.kind()).collect()
    }

    /// Avalia uma transação
    ///
    /// Só falha quando a transação não tem remetente ou destinatário; nesse
    /// caso nenhum avaliador é executado.
    pub fn analyze(&self, tx: &Transaction) -> Result<DetectionReport> {
        if let Err(e) = tx.validate() {
            warn!("Transação rejeitada: {}", e);
            return Err(e);
        }

        let legitimacy = LegitimacyOverride::new(&self.config, &self.registry).assess(tx);
        if let Some(reason) = legitimacy {
            debug!("Transação considerada legítima: {}", reason);
        }

        let ctx = EvaluationContext {
            tx,
            config: &self.config,
            registry: &self.registry,
            legitimacy,
        };

        let mut findings = Vec::new();
        for evaluator in &self.evaluators {
            match evaluator.evaluate(&ctx) {
                Some(finding) => {
                    debug!("Regra {} disparou: {}", evaluator.kind(), finding.message);
                    findings.push(finding);
                }
                None => debug!("Regra {} não disparou", evaluator.kind()),
            }
        }

        let report = DetectionReport::from_findings(tx, findings);
        info!(
            "Análise concluída: detected={} regras={:?}",
            report.detected,
            report.fired_rules().iter().map(|k| k.as_str()).collect::<Vec<_>>()
        );

        Ok(report)
    }

    /// Desserializa uma transação JSON e a avalia
    pub fn analyze_json(&self, raw: &str) -> Result<DetectionReport> {
        let tx = Transaction::from_json(raw)?;
        self.analyze(&tx)
    }
}

impl Default for ThreatEngine {
    fn default() -> Self {
        Self::new(DetectionConfig::default(), SignatureRegistry::default())
    }
}
