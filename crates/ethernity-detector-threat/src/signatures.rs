/*!
 * Ethernity Threat Detector - Signatures
 *
 * Tabela tipada de seletores de função conhecidos
 */

use ethernity_core::utils::{keccak256, strip_0x};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Seletor de função (4 primeiros bytes do calldata)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Calcula o seletor de uma assinatura canônica, ex. `transfer(address,uint256)`
    pub fn from_signature(signature: &str) -> Self {
        let hash = keccak256(signature.as_bytes());
        Self([hash[0], hash[1], hash[2], hash[3]])
    }

    /// Extrai o seletor de um calldata hexadecimal
    ///
    /// Calldata com menos de 4 bytes não possui seletor.
    pub fn from_calldata(calldata: &str) -> Option<Self> {
        let digits = strip_0x(calldata.trim()).get(..8)?;
        let bytes = hex::decode(digits).ok()?;
        Some(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Representação `0x` + 8 dígitos hexadecimais
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Ação de governança
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceAction {
    Propose,
    CastVote,
    Queue,
    Execute,
    Delegate,
    Cancel,
}

/// Categoria de uma assinatura conhecida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    Transfer,
    TransferFrom,
    Approve,
    Phishing,
    Poisoning,
    Withdraw,
    Deposit,
    Mint,
    FlashLoan,
    Borrow,
    Governance(GovernanceAction),
    TimeManipulation,
    OracleRead,
    OracleUpdate,
    Swap,
    Bridge,
    ProofVerification,
}

impl SignatureKind {
    /// Movimentações de token (`transfer`/`transferFrom`)
    pub fn is_transfer(&self) -> bool {
        matches!(self, SignatureKind::Transfer | SignatureKind::TransferFrom)
    }

    /// Chamadas que alteram estado do contrato chamado
    pub fn is_state_changing(&self) -> bool {
        matches!(
            self,
            SignatureKind::Transfer
                | SignatureKind::TransferFrom
                | SignatureKind::Approve
                | SignatureKind::Withdraw
                | SignatureKind::Deposit
                | SignatureKind::Mint
                | SignatureKind::Borrow
                | SignatureKind::OracleUpdate
        )
    }

    pub fn is_governance(&self) -> bool {
        matches!(self, SignatureKind::Governance(_))
    }

    pub fn is_oracle(&self) -> bool {
        matches!(self, SignatureKind::OracleRead | SignatureKind::OracleUpdate)
    }
}

/// Assinatura conhecida
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownSignature {
    pub signature: String,
    pub kind: SignatureKind,
}

/// Assinatura canônica do evento `OwnershipTransferred(address,address)`
pub const OWNERSHIP_TRANSFERRED_EVENT: &str = "OwnershipTransferred(address,address)";

const DEFAULT_SIGNATURES: &[(&str, SignatureKind)] = &[
    // ERC20
    ("transfer(address,uint256)", SignatureKind::Transfer),
    ("transferFrom(address,address,uint256)", SignatureKind::TransferFrom),
    ("approve(address,uint256)", SignatureKind::Approve),
    ("mint(address,uint256)", SignatureKind::Mint),
    // Drainers
    ("setApprovalForAll(address,bool)", SignatureKind::Phishing),
    ("permit(address,address,uint256,uint256,uint8,bytes32,bytes32)", SignatureKind::Phishing),
    ("increaseAllowance(address,uint256)", SignatureKind::Phishing),
    ("securityUpdate()", SignatureKind::Phishing),
    ("claimAirdrop()", SignatureKind::Phishing),
    // Troca de implementação / admin
    ("upgradeTo(address)", SignatureKind::Poisoning),
    ("upgradeToAndCall(address,bytes)", SignatureKind::Poisoning),
    ("changeAdmin(address)", SignatureKind::Poisoning),
    ("setImplementation(address)", SignatureKind::Poisoning),
    ("initialize(address)", SignatureKind::Poisoning),
    // Cofres
    ("withdraw(uint256)", SignatureKind::Withdraw),
    ("withdraw()", SignatureKind::Withdraw),
    ("withdrawTo(address,uint256)", SignatureKind::Withdraw),
    ("deposit()", SignatureKind::Deposit),
    ("deposit(uint256)", SignatureKind::Deposit),
    // Flash loans (Aave v2/v3, ERC-3156, Uniswap v3, Balancer)
    ("flashLoan(address,address[],uint256[],uint256[],address,bytes,uint16)", SignatureKind::FlashLoan),
    ("flashLoanSimple(address,address,uint256,bytes,uint16)", SignatureKind::FlashLoan),
    ("flashLoan(address,address,uint256,bytes)", SignatureKind::FlashLoan),
    ("flash(address,uint256,uint256,bytes)", SignatureKind::FlashLoan),
    ("flashLoan(address,address[],uint256[],bytes)", SignatureKind::FlashLoan),
    // Lending
    ("borrow(address,uint256,uint256,uint16,address)", SignatureKind::Borrow),
    ("borrow(uint256)", SignatureKind::Borrow),
    // Governança (GovernorAlpha/Bravo e OpenZeppelin Governor)
    ("propose(address[],uint256[],string[],bytes[],string)", SignatureKind::Governance(GovernanceAction::Propose)),
    ("propose(address[],uint256[],bytes[],string)", SignatureKind::Governance(GovernanceAction::Propose)),
    ("castVote(uint256,bool)", SignatureKind::Governance(GovernanceAction::CastVote)),
    ("castVote(uint256,uint8)", SignatureKind::Governance(GovernanceAction::CastVote)),
    ("castVoteWithReason(uint256,uint8,string)", SignatureKind::Governance(GovernanceAction::CastVote)),
    ("queue(uint256)", SignatureKind::Governance(GovernanceAction::Queue)),
    ("execute(uint256)", SignatureKind::Governance(GovernanceAction::Execute)),
    ("execute(address[],uint256[],bytes[],bytes32)", SignatureKind::Governance(GovernanceAction::Execute)),
    ("delegate(address)", SignatureKind::Governance(GovernanceAction::Delegate)),
    ("cancel(uint256)", SignatureKind::Governance(GovernanceAction::Cancel)),
    // Timelock
    ("setDelay(uint256)", SignatureKind::TimeManipulation),
    ("updateDelay(uint256)", SignatureKind::TimeManipulation),
    ("warp(uint256)", SignatureKind::TimeManipulation),
    ("setTimestamp(uint256)", SignatureKind::TimeManipulation),
    // Oráculos
    ("latestRoundData()", SignatureKind::OracleRead),
    ("latestAnswer()", SignatureKind::OracleRead),
    ("getPrice(address)", SignatureKind::OracleRead),
    ("consult(address,uint256)", SignatureKind::OracleRead),
    ("getReserves()", SignatureKind::OracleRead),
    ("update()", SignatureKind::OracleUpdate),
    ("updatePrice(address,uint256)", SignatureKind::OracleUpdate),
    ("setPrice(address,uint256)", SignatureKind::OracleUpdate),
    ("sync()", SignatureKind::OracleUpdate),
    // DEX
    ("swap(uint256,uint256,address,bytes)", SignatureKind::Swap),
    ("swapExactTokensForTokens(uint256,uint256,address[],address,uint256)", SignatureKind::Swap),
    ("swapExactETHForTokens(uint256,address[],address,uint256)", SignatureKind::Swap),
    ("exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))", SignatureKind::Swap),
    ("exchange(int128,int128,uint256,uint256)", SignatureKind::Swap),
    // Bridges
    ("relayMessage(address,address,bytes,uint256)", SignatureKind::Bridge),
    ("receiveMessage(bytes,bytes)", SignatureKind::Bridge),
    ("finalizeWithdrawal(bytes)", SignatureKind::Bridge),
    ("lock(address,uint256,uint256)", SignatureKind::Bridge),
    ("verifyHeaderAndExecuteTx(bytes,bytes,bytes,bytes,bytes)", SignatureKind::Bridge),
    ("verifyProof(bytes32,bytes32[],bytes32)", SignatureKind::ProofVerification),
    ("verifySignatures(bytes32,bytes)", SignatureKind::ProofVerification),
    ("verifyMessage(bytes,bytes)", SignatureKind::ProofVerification),
    ("checkSignatures(bytes32,bytes,bytes)", SignatureKind::ProofVerification),
];

/// Registro de assinaturas conhecidas, indexado por seletor
///
/// Montado uma vez antes da construção do engine e apenas lido depois disso.
#[derive(Debug, Clone)]
pub struct SignatureRegistry {
    entries: HashMap<Selector, KnownSignature>,
    ownership_transferred_topic: String,
}

impl SignatureRegistry {
    /// Cria um registro vazio
    pub fn empty() -> Self {
        let topic = keccak256(OWNERSHIP_TRANSFERRED_EVENT.as_bytes());
        Self {
            entries: HashMap::new(),
            ownership_transferred_topic: format!("0x{}", hex::encode(topic)),
        }
    }

    /// Registra uma assinatura e retorna o seletor calculado
    pub fn register(&mut self, signature: &str, kind: SignatureKind) -> Selector {
        let selector = Selector::from_signature(signature);
        self.entries.insert(
            selector,
            KnownSignature {
                signature: signature.to_string(),
                kind,
            },
        );
        selector
    }

    pub fn lookup(&self, selector: &Selector) -> Option<&KnownSignature> {
        self.entries.get(selector)
    }

    /// Categoria do seletor contido em um calldata
    pub fn classify(&self, calldata: Option<&str>) -> Option<SignatureKind> {
        let selector = Selector::from_calldata(calldata?)?;
        self.lookup(&selector).map(|known| known.kind)
    }

    /// Tópico `OwnershipTransferred` em hex minúsculo com prefixo
    pub fn ownership_transferred_topic(&self) -> &str {
        &self.ownership_transferred_topic
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (signature, kind) in DEFAULT_SIGNATURES {
            registry.register(signature, *kind);
        }
        registry
    }
}
