use ethereum_types::U256;
use ethernity_core::utils::{normalize_address, parse_quantity, strip_0x};
use ethernity_core::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::signatures::Selector;

/// Chamada registrada no trace (nó da árvore de chamadas)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<CallRecord>,
}

impl CallRecord {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_gas_used(mut self, gas_used: u64) -> Self {
        self.gas_used = Some(gas_used.to_string());
        self
    }

    pub fn with_calls(mut self, calls: Vec<CallRecord>) -> Self {
        self.calls = calls;
        self
    }

    /// Endereço de origem normalizado; vazio conta como ausente
    pub fn from_address(&self) -> Option<String> {
        non_empty_address(self.from.as_deref())
    }

    /// Endereço de destino normalizado; vazio conta como ausente
    pub fn to_address(&self) -> Option<String> {
        non_empty_address(self.to.as_deref())
    }

    pub fn value_wei(&self) -> Option<U256> {
        self.value.as_deref().and_then(parse_quantity)
    }

    /// Valor da chamada, zero quando ausente ou inválido
    pub fn value_or_zero(&self) -> U256 {
        self.value_wei().unwrap_or_default()
    }

    pub fn has_positive_value(&self) -> bool {
        !self.value_or_zero().is_zero()
    }

    pub fn gas_used_amount(&self) -> Option<U256> {
        self.gas_used.as_deref().and_then(parse_quantity)
    }

    pub fn selector(&self) -> Option<Selector> {
        self.input.as_deref().and_then(Selector::from_calldata)
    }

    /// Dígitos hexadecimais do input, sem `0x`
    pub fn input_digits(&self) -> &str {
        hex_digits(self.input.as_deref())
    }

    /// Dígitos hexadecimais do output, sem `0x`
    pub fn output_digits(&self) -> &str {
        hex_digits(self.output.as_deref())
    }

    /// Palavra ABI de índice `index` após o seletor
    pub fn abi_word(&self, index: usize) -> Option<&str> {
        let start = 8 + index * 64;
        self.input_digits().get(start..start + 64)
    }

    /// Palavra ABI interpretada como endereço
    pub fn abi_address(&self, index: usize) -> Option<String> {
        self.abi_word(index).and_then(word_to_address)
    }

    /// Palavra ABI interpretada como inteiro
    pub fn abi_uint(&self, index: usize) -> Option<U256> {
        let word = self.abi_word(index)?;
        U256::from_str_radix(word, 16).ok()
    }
}

/// Entrada de log emitida durante a execução
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Log {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Estado de uma conta antes ou depois da transação
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storage: BTreeMap<String, String>,
}

/// Mapa endereço → estado
pub type StateSnapshot = BTreeMap<String, AccountState>;

/// Trace completo de uma transação
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<Log>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<CallRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<StateSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<StateSnapshot>,
}

impl Trace {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            ..Default::default()
        }
    }

    pub fn sender(&self) -> String {
        normalize_address(&self.from)
    }

    pub fn recipient(&self) -> String {
        normalize_address(&self.to)
    }

    pub fn value_wei(&self) -> Option<U256> {
        self.value.as_deref().and_then(parse_quantity)
    }

    /// Limite de gas da transação
    pub fn gas_limit(&self) -> Option<U256> {
        self.gas.as_deref().and_then(parse_quantity)
    }

    pub fn selector(&self) -> Option<Selector> {
        self.input.as_deref().and_then(Selector::from_calldata)
    }

    /// Registro equivalente à chamada de nível superior
    pub fn as_call(&self) -> CallRecord {
        CallRecord {
            from: Some(self.from.clone()),
            to: Some(self.to.clone()),
            input: self.input.clone(),
            output: self.output.clone(),
            value: self.value.clone(),
            gas: self.gas.clone(),
            gas_used: self.gas_used.clone(),
            call_type: None,
            error: None,
            calls: Vec::new(),
        }
    }

    /// Chamada de nível superior com toda a árvore de subchamadas
    pub fn root_call(&self) -> CallRecord {
        CallRecord {
            calls: self.calls.clone(),
            ..self.as_call()
        }
    }
}

/// Sinais externos fornecidos pelo chamador
///
/// Nada aqui é derivado do trace: quórum de multisig, preços em outra chain e
/// histórico de execução só existem fora de uma transação isolada.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliaryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_sender: Option<bool>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub signatures_required: Option<u64>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub signatures_provided: Option<u64>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub validators_required: Option<u64>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub validators_confirmed: Option<u64>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub source_chain_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub destination_chain_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::decimal", skip_serializing_if = "Option::is_none")]
    pub source_chain_price: Option<f64>,
    #[serde(default, deserialize_with = "wire::decimal", skip_serializing_if = "Option::is_none")]
    pub destination_chain_price: Option<f64>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub source_locked_amount: Option<String>,
    #[serde(default, deserialize_with = "wire::quantity", skip_serializing_if = "Option::is_none")]
    pub destination_minted_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previously_executed: Option<bool>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub original_chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altered_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_protocol: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_verified_contracts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_false_positive: Option<bool>,
    /// Chaves não reconhecidas são preservadas
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AuxiliaryContext {
    pub fn has_chain_context(&self) -> bool {
        self.source_chain_id.is_some()
            || self.destination_chain_id.is_some()
            || self.original_chain_id.is_some()
    }

    pub fn is_known_false_positive(&self) -> bool {
        self.known_false_positive.unwrap_or(false)
    }
}

/// Unidade de avaliação
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "wire::number", skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_name: Option<String>,
    pub trace: Trace,
    #[serde(default)]
    pub context: AuxiliaryContext,
}

impl Transaction {
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: AuxiliaryContext) -> Self {
        self.context = context;
        self
    }

    /// Desserializa uma transação no formato JSON de entrada
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| Error::DecodeError(format!("Falha ao deserializar transação: {}", e)))
    }

    /// Valida os campos obrigatórios antes de qualquer avaliação
    pub fn validate(&self) -> Result<()> {
        if strip_0x(self.trace.from.trim()).is_empty() {
            return Err(Error::ValidationError("remetente (from) ausente".to_string()));
        }
        if strip_0x(self.trace.to.trim()).is_empty() {
            return Err(Error::ValidationError("destinatário (to) ausente".to_string()));
        }
        Ok(())
    }
}

fn non_empty_address(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if strip_0x(raw).is_empty() {
        None
    } else {
        Some(normalize_address(raw))
    }
}

fn hex_digits(raw: Option<&str>) -> &str {
    raw.map(|s| strip_0x(s.trim())).unwrap_or("")
}

/// Interpreta uma palavra de 32 bytes como endereço (últimos 20 bytes)
pub fn word_to_address(word: &str) -> Option<String> {
    let digits = strip_0x(word);
    let tail = digits.get(digits.len().checked_sub(40)?..)?;
    Some(format!("0x{}", tail.to_ascii_lowercase()))
}

/// Desserializadores tolerantes para campos numéricos do formato de entrada
mod wire {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    /// Quantidade mantida como string; números JSON são convertidos
    pub fn quantity<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
        Ok(Option::<Raw>::deserialize(d)?.map(|raw| match raw {
            Raw::Text(text) => text,
            Raw::Integer(n) => n.to_string(),
            Raw::Float(f) => format!("{}", f),
        }))
    }

    /// Inteiro pequeno vindo como número ou string; inválido vira `None`
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<u64>, D::Error> {
        Ok(Option::<Raw>::deserialize(d)?.and_then(|raw| match raw {
            Raw::Text(text) => parse_quantity(&text).filter(|n| n.bits() <= 64).map(|n| n.as_u64()),
            Raw::Integer(n) => Some(n),
            Raw::Float(_) => None,
        }))
    }

    /// Decimal vindo como número ou string; inválido vira `None`
    pub fn decimal<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
        Ok(Option::<Raw>::deserialize(d)?.and_then(|raw| match raw {
            Raw::Text(text) => text.trim().parse().ok(),
            Raw::Integer(n) => Some(n as f64),
            Raw::Float(f) => Some(f),
        }))
    }
}
