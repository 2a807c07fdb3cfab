/*!
 * Ethernity Utils
 *
 * Utilitários comuns usados em toda a workspace Ethernity
 */

use ethereum_types::U256;
use tiny_keccak::{Hasher, Keccak};

/// Quantidade de wei em 1 ETH
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Remove o prefixo `0x` de uma string hexadecimal
pub fn strip_0x(hex: &str) -> &str {
    hex.strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
}

/// Normaliza um endereço para minúsculas com prefixo `0x`
pub fn normalize_address(address: &str) -> String {
    format!("0x{}", strip_0x(address.trim()).to_ascii_lowercase())
}

/// Converte uma quantidade em string (hexadecimal `0x..` ou decimal) para U256
///
/// `"0x"` sozinho vale zero, como no JSON-RPC. Qualquer outra coisa que não
/// seja um número válido retorna `None`.
pub fn parse_quantity(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with("0x") || raw.starts_with("0X") {
        let digits = strip_0x(raw);
        if digits.is_empty() {
            return Some(U256::zero());
        }
        return U256::from_str_radix(digits, 16).ok();
    }

    U256::from_dec_str(raw).ok()
}

/// Decodifica bytes hexadecimais, com ou sem prefixo
pub fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    hex::decode(strip_0x(hex.trim())).ok()
}

/// Calcula o hash Keccak-256 de dados
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut result = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut result);
    result
}

/// Converte uma quantidade inteira de ETH para wei
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WEI_PER_ETHER)
}

/// Verifica se `part >= whole * bps / 10_000` sem risco de overflow
pub fn meets_ratio_bps(part: U256, whole: U256, bps: u64) -> bool {
    part.full_mul(U256::from(10_000u64)) >= whole.full_mul(U256::from(bps))
}

/// Verifica se `value > base * bps / 10_000` sem risco de overflow
pub fn exceeds_ratio_bps(value: U256, base: U256, bps: u64) -> bool {
    value.full_mul(U256::from(10_000u64)) > base.full_mul(U256::from(bps))
}

/// Converte U256 para f64 (com perda de precisão para valores grandes)
pub fn u256_to_f64(value: &U256) -> f64 {
    if value.bits() <= 128 {
        value.low_u128() as f64
    } else {
        value.to_string().parse().unwrap_or(f64::MAX)
    }
}

/// Formata um valor com decimais para exibição
pub fn format_token_amount(amount: &U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let integer_part = amount / divisor;
    let fractional_part = amount % divisor;

    // Parte fracionária com zeros à esquerda
    let fractional_str = fractional_part.to_string();
    let padding = decimals as usize - fractional_str.len();
    let mut padded_fractional = "0".repeat(padding);
    padded_fractional.push_str(&fractional_str);

    while padded_fractional.ends_with('0') {
        padded_fractional.pop();
    }

    if padded_fractional.is_empty() {
        integer_part.to_string()
    } else {
        format!("{}.{}", integer_part, padded_fractional)
    }
}

/// Formata um valor em wei como ETH
pub fn format_ether(amount: &U256) -> String {
    format!("{} ETH", format_token_amount(amount, 18))
}
