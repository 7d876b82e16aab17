/// In-memory chain state
///
/// One network identifier, an unlocked account list, a single token ledger
/// and a receipt store. Transactions are "mined" synchronously: a transfer
/// with insufficient balance still gets a receipt, just a failed one.
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

const SELECTOR_NAME: &str = "06fdde03";
const SELECTOR_SYMBOL: &str = "95d89b41";
const SELECTOR_BALANCE_OF: &str = "70a08231";
const SELECTOR_TRANSFER: &str = "a9059cbb";

/// JSON-RPC error payload produced by the mock node.
#[derive(Debug, Clone)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            code: -32000,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub network_id: String,
    pub accounts: Vec<String>,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub initial_balance: BigUint,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub hash: String,
    pub success: bool,
    pub block_number: u64,
}

struct ChainInner {
    network_id: String,
    accounts: Vec<String>,
    token_address: String,
    token_name: String,
    token_symbol: String,
    balances: HashMap<String, BigUint>,
    receipts: HashMap<String, Receipt>,
    block_number: u64,
}

pub struct MockChain {
    inner: Mutex<ChainInner>,
}

impl MockChain {
    pub fn new(config: ChainConfig) -> Self {
        let mut balances = HashMap::new();
        for account in &config.accounts {
            balances.insert(account.to_lowercase(), config.initial_balance.clone());
        }
        Self {
            inner: Mutex::new(ChainInner {
                network_id: config.network_id,
                accounts: config.accounts.iter().map(|a| a.to_lowercase()).collect(),
                token_address: config.token_address.to_lowercase(),
                token_name: config.token_name,
                token_symbol: config.token_symbol,
                balances,
                receipts: HashMap::new(),
                block_number: 0,
            }),
        }
    }

    pub fn network_id(&self) -> String {
        self.lock().network_id.clone()
    }

    pub fn set_network_id(&self, network_id: String) {
        self.lock().network_id = network_id;
    }

    pub fn accounts(&self) -> Vec<String> {
        self.lock().accounts.clone()
    }

    pub fn set_accounts(&self, accounts: Vec<String>) {
        let mut inner = self.lock();
        inner.accounts = accounts.iter().map(|a| a.to_lowercase()).collect();
    }

    pub fn fund(&self, account: &str, amount: BigUint) {
        let mut inner = self.lock();
        inner.balances.insert(account.to_lowercase(), amount);
    }

    pub fn balance(&self, account: &str) -> BigUint {
        self.lock()
            .balances
            .get(&account.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn receipt(&self, hash: &str) -> Option<Receipt> {
        self.lock().receipts.get(hash).cloned()
    }

    /// Serve a read-only contract call against the token ledger.
    pub fn call(&self, to: &str, data: &str) -> Result<String, RpcError> {
        let inner = self.lock();
        if to.to_lowercase() != inner.token_address {
            return Err(RpcError::execution(format!("no contract at {}", to)));
        }

        let bare = data.strip_prefix("0x").unwrap_or(data);
        let selector = bare.get(..8).unwrap_or("");
        match selector {
            SELECTOR_NAME => Ok(encode_string(&inner.token_name)),
            SELECTOR_SYMBOL => Ok(encode_string(&inner.token_symbol)),
            SELECTOR_BALANCE_OF => {
                let account = decode_address_word(bare.get(8..).unwrap_or(""))?;
                let balance = inner.balances.get(&account).cloned().unwrap_or_default();
                Ok(encode_uint(&balance))
            }
            other => Err(RpcError::execution(format!("unknown selector {}", other))),
        }
    }

    /// Mine a transfer transaction and store its receipt.
    ///
    /// Unknown senders are rejected outright (the wallet cannot sign for
    /// them); a known sender with insufficient balance gets a failed receipt.
    pub fn send_transaction(&self, from: &str, to: &str, data: &str) -> Result<String, RpcError> {
        let mut inner = self.lock();
        let from = from.to_lowercase();
        if !inner.accounts.contains(&from) {
            return Err(RpcError::execution(format!("unknown account {}", from)));
        }
        if to.to_lowercase() != inner.token_address {
            return Err(RpcError::execution(format!("no contract at {}", to)));
        }

        let bare = data.strip_prefix("0x").unwrap_or(data);
        if bare.get(..8) != Some(SELECTOR_TRANSFER) {
            return Err(RpcError::invalid_params("unsupported transaction data"));
        }
        let recipient = decode_address_word(bare.get(8..72).unwrap_or(""))?;
        let amount = decode_uint_word(bare.get(72..136).unwrap_or(""))?;

        inner.block_number += 1;
        let block_number = inner.block_number;
        let hash = transaction_hash(block_number, &from, &recipient, &amount);

        let sender_balance = inner.balances.get(&from).cloned().unwrap_or_default();
        let success = sender_balance >= amount;
        if success {
            inner
                .balances
                .insert(from.clone(), sender_balance - amount.clone());
            let recipient_balance = inner.balances.entry(recipient.clone()).or_default();
            *recipient_balance += amount.clone();
            log::info!("mined transfer {} -> {} ({})", from, recipient, amount);
        } else {
            log::info!(
                "mined failed transfer {} -> {} ({}): insufficient balance",
                from,
                recipient,
                amount
            );
        }

        inner.receipts.insert(
            hash.clone(),
            Receipt {
                hash: hash.clone(),
                success,
                block_number,
            },
        );
        Ok(hash)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChainInner> {
        self.inner.lock().expect("chain state lock poisoned")
    }
}

fn transaction_hash(nonce: u64, from: &str, to: &str, amount: &BigUint) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce.to_be_bytes());
    hasher.update(from.as_bytes());
    hasher.update(to.as_bytes());
    hasher.update(amount.to_bytes_be());
    format!("0x{}", hex::encode(hasher.finalize()))
}

fn encode_uint(value: &BigUint) -> String {
    format!("0x{:0>64}", value.to_str_radix(16))
}

fn encode_string(value: &str) -> String {
    let payload = hex::encode(value.as_bytes());
    let padded_len = (payload.len() + 63) / 64 * 64;
    format!(
        "0x{:0>64}{:0>64}{:0<width$}",
        "20",
        format!("{:x}", value.len()),
        payload,
        width = padded_len.max(64)
    )
}

fn decode_address_word(word: &str) -> Result<String, RpcError> {
    if word.len() < 64 {
        return Err(RpcError::invalid_params("truncated address argument"));
    }
    let addr = &word[24..64];
    if !addr.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RpcError::invalid_params("malformed address argument"));
    }
    Ok(format!("0x{}", addr.to_lowercase()))
}

fn decode_uint_word(word: &str) -> Result<BigUint, RpcError> {
    if word.len() < 64 {
        return Err(RpcError::invalid_params("truncated amount argument"));
    }
    BigUint::parse_bytes(word.as_bytes(), 16)
        .ok_or_else(|| RpcError::invalid_params("malformed amount argument"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
    const ALICE: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    const BOB: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    fn chain() -> MockChain {
        MockChain::new(ChainConfig {
            network_id: "1337".to_string(),
            accounts: vec![ALICE.to_string()],
            token_address: TOKEN.to_string(),
            token_name: "Demo Token".to_string(),
            token_symbol: "DEMO".to_string(),
            initial_balance: BigUint::from(1000u32),
        })
    }

    fn transfer_data(to: &str, amount: u64) -> String {
        format!(
            "0x{}{:0>64}{:0>64}",
            SELECTOR_TRANSFER,
            to.trim_start_matches("0x"),
            format!("{:x}", amount)
        )
    }

    #[test]
    fn test_transfer_moves_balance() {
        let chain = chain();
        let hash = chain
            .send_transaction(ALICE, TOKEN, &transfer_data(BOB, 400))
            .unwrap();

        let receipt = chain.receipt(&hash).unwrap();
        assert!(receipt.success);
        assert_eq!(chain.balance(ALICE), BigUint::from(600u32));
        assert_eq!(chain.balance(BOB), BigUint::from(400u32));
    }

    #[test]
    fn test_insufficient_balance_mines_failed_receipt() {
        let chain = chain();
        let hash = chain
            .send_transaction(ALICE, TOKEN, &transfer_data(BOB, 5000))
            .unwrap();

        let receipt = chain.receipt(&hash).unwrap();
        assert!(!receipt.success);
        assert_eq!(chain.balance(ALICE), BigUint::from(1000u32));
        assert_eq!(chain.balance(BOB), BigUint::from(0u32));
    }

    #[test]
    fn test_unknown_sender_is_rejected() {
        let chain = chain();
        let err = chain
            .send_transaction(BOB, TOKEN, &transfer_data(ALICE, 1))
            .unwrap_err();
        assert_eq!(err.code, -32000);
    }

    #[test]
    fn test_call_answers_metadata_and_balance() {
        let chain = chain();
        let name = chain.call(TOKEN, &format!("0x{}", SELECTOR_NAME)).unwrap();
        assert!(name.contains(&hex::encode("Demo Token")));

        let data = format!(
            "0x{}{:0>64}",
            SELECTOR_BALANCE_OF,
            ALICE.trim_start_matches("0x")
        );
        let balance = chain.call(TOKEN, &data).unwrap();
        assert_eq!(balance, encode_uint(&BigUint::from(1000u32)));
    }
}
