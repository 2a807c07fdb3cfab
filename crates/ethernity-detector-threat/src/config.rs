use ethereum_types::U256;
use ethernity_core::utils::{ether, normalize_address};
use ethernity_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Endereços maliciosos conhecidos (Tornado Cash router, exploiter da Ronin)
const DEFAULT_BLACKLIST: &[&str] = &[
    "0xd90e2f925da726b50c4ed8d0fb90ad053324f31b",
    "0x098b716b8aaf21512996dc57eb0615e2383e2f96",
];

/// Configuração da detecção de ameaças
///
/// Valor imutável injetado no engine. Campos ausentes no JSON assumem o
/// valor padrão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Valor acima do qual uma transferência é considerada anormal (wei)
    #[serde(with = "wei")]
    pub high_value_threshold: U256,
    /// Limite de gas acima do qual há suspeita de front-running
    pub gas_limit_threshold: u64,
    /// Custo base de uma transferência simples
    pub gas_baseline: u64,
    /// Múltiplo do limite que ativa o gatilho estrito para `transfer`
    pub gas_spike_multiplier: u64,
    /// Profundidade máxima da busca de ciclos no grafo de chamadas
    pub max_search_depth: usize,
    /// Profundidade máxima ao percorrer chamadas aninhadas
    pub max_walk_depth: usize,
    /// Similaridade mínima (exclusiva) entre endereços parecidos
    pub similarity_threshold: f64,
    /// Repetições de um mesmo caractere no hash consideradas suspeitas
    pub hash_max_char_repeats: usize,
    /// Tamanho de sequência ascendente suspeita no hash
    pub hash_ascending_run: usize,
    /// Sequência de `f` que caracteriza allowance ilimitada
    pub max_allowance_run: usize,
    /// Número de chamadas acima do qual a lista é suspeita
    pub max_call_count: usize,
    /// Chamadas para um mesmo destino acima das quais há suspeita
    pub max_calls_per_target: usize,
    /// Razão output/input suspeita
    pub output_input_ratio: usize,
    /// Fração mínima (bps) do empréstimo devolvida para considerá-lo quitado
    pub flash_loan_repay_ratio_bps: u64,
    /// Transferência que caracteriza drenagem de tesouraria (wei)
    #[serde(with = "wei")]
    pub treasury_drain_threshold: U256,
    /// Transferências que, junto de governança, indicam compra de votos
    pub vote_buying_min_transfers: usize,
    /// Swaps que caracterizam manipulação de TWAP
    pub twap_min_swaps: usize,
    /// Gas abaixo do qual uma leitura de oráculo não valida os dados
    pub oracle_min_gas: u64,
    /// Razão post/pre de um slot que indica salto de preço
    pub price_jump_ratio: f64,
    /// Gas abaixo do qual uma verificação de prova é insuficiente
    pub proof_min_gas: u64,
    /// Mínimo de chamadas de verificação em operações de bridge
    pub min_verification_calls: usize,
    /// Desvio relativo de preço tolerado entre chains
    pub price_deviation_ratio: f64,
    pub blacklist: Vec<String>,
    pub trusted_senders: Vec<String>,
    pub bridge_addresses: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: ether(100),
            gas_limit_threshold: 1_000_000,
            gas_baseline: 21_000,
            gas_spike_multiplier: 2,
            max_search_depth: 3,
            max_walk_depth: 8,
            similarity_threshold: 0.7,
            hash_max_char_repeats: 20,
            hash_ascending_run: 10,
            max_allowance_run: 32,
            max_call_count: 8,
            max_calls_per_target: 3,
            output_input_ratio: 100,
            flash_loan_repay_ratio_bps: 9_900,
            treasury_drain_threshold: ether(1_000),
            vote_buying_min_transfers: 3,
            twap_min_swaps: 3,
            oracle_min_gas: 30_000,
            price_jump_ratio: 1.5,
            proof_min_gas: 20_000,
            min_verification_calls: 2,
            price_deviation_ratio: 0.2,
            blacklist: DEFAULT_BLACKLIST.iter().map(|a| a.to_string()).collect(),
            trusted_senders: Vec::new(),
            bridge_addresses: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Carrega a configuração a partir de JSON
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| Error::ConfigError(format!("JSON inválido: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Carrega a configuração a partir de um arquivo JSON
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.similarity_threshold) {
            return Err(Error::ConfigError(format!(
                "similarity_threshold fora de [0, 1): {}",
                self.similarity_threshold
            )));
        }
        if self.max_search_depth == 0 {
            return Err(Error::ConfigError("max_search_depth deve ser maior que zero".to_string()));
        }
        if self.price_jump_ratio <= 0.0 || self.price_deviation_ratio < 0.0 {
            return Err(Error::ConfigError("razões de preço devem ser positivas".to_string()));
        }
        Ok(())
    }

    pub fn is_blacklisted(&self, address: &str) -> bool {
        contains_address(&self.blacklist, address)
    }

    pub fn is_trusted_sender(&self, address: &str) -> bool {
        contains_address(&self.trusted_senders, address)
    }

    pub fn is_bridge_address(&self, address: &str) -> bool {
        contains_address(&self.bridge_addresses, address)
    }

    /// `price_jump_ratio` em pontos base
    pub fn price_jump_bps(&self) -> u64 {
        (self.price_jump_ratio * 10_000.0).round() as u64
    }
}

fn contains_address(list: &[String], address: &str) -> bool {
    let address = normalize_address(address);
    list.iter().any(|entry| normalize_address(entry) == address)
}

/// Valores em wei: serializados como string decimal, aceitos em decimal ou hex
mod wei {
    use ethereum_types::U256;
    use ethernity_core::utils::parse_quantity;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Integer(n) => Ok(U256::from(n)),
            Raw::Text(text) => parse_quantity(&text)
                .ok_or_else(|| de::Error::custom(format!("quantidade inválida: {}", text))),
        }
    }
}
