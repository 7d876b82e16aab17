/// Call-data codec for the token contract surface
///
/// Hand-encodes the four fixed-signature calls the controller needs. Words
/// are 32 bytes, hex encoded without the `0x` prefix until assembled.
use num_bigint::BigUint;

use crate::provider::ProviderError;

pub const SELECTOR_NAME: &str = "06fdde03";
pub const SELECTOR_SYMBOL: &str = "95d89b41";
pub const SELECTOR_BALANCE_OF: &str = "70a08231";
pub const SELECTOR_TRANSFER: &str = "a9059cbb";

const WORD_HEX_LEN: usize = 64;

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

/// Encode an address as a left-padded 32-byte word.
pub fn encode_address(address: &str) -> Result<String, ProviderError> {
    let bare = strip_0x(address).to_lowercase();
    if bare.len() != 40 || !bare.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProviderError::InvalidResponse(format!(
            "not a 20-byte hex address: {}",
            address
        )));
    }
    Ok(format!("{:0>64}", bare))
}

/// Encode an unsigned amount as a left-padded 32-byte word.
pub fn encode_uint(value: &BigUint) -> String {
    format!("{:0>64}", value.to_str_radix(16))
}

/// Assemble calldata for `balanceOf(address)`.
pub fn balance_of_data(account: &str) -> Result<String, ProviderError> {
    Ok(format!("0x{}{}", SELECTOR_BALANCE_OF, encode_address(account)?))
}

/// Assemble calldata for `transfer(address,uint256)`.
pub fn transfer_data(to: &str, amount: &BigUint) -> Result<String, ProviderError> {
    Ok(format!(
        "0x{}{}{}",
        SELECTOR_TRANSFER,
        encode_address(to)?,
        encode_uint(amount)
    ))
}

/// Decode a single uint word returned by `eth_call`.
pub fn decode_uint(data: &str) -> Result<BigUint, ProviderError> {
    let bare = strip_0x(data);
    if bare.is_empty() {
        return Ok(BigUint::default());
    }
    BigUint::parse_bytes(bare.as_bytes(), 16)
        .ok_or_else(|| ProviderError::InvalidResponse(format!("not a hex quantity: {}", data)))
}

/// Decode an ABI dynamic string (offset word, length word, utf-8 bytes).
pub fn decode_string(data: &str) -> Result<String, ProviderError> {
    let bare = strip_0x(data);
    let bytes = hex::decode(bare)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad hex in string return: {}", e)))?;

    if bytes.len() < 64 {
        return Err(ProviderError::InvalidResponse(
            "string return shorter than header".to_string(),
        ));
    }

    let offset = word_as_usize(&bytes[..32])?;
    let len_start = offset;
    if bytes.len() < len_start + 32 {
        return Err(ProviderError::InvalidResponse(
            "string offset past end of data".to_string(),
        ));
    }
    let length = word_as_usize(&bytes[len_start..len_start + 32])?;
    let data_start = len_start + 32;
    if bytes.len() < data_start + length {
        return Err(ProviderError::InvalidResponse(
            "string length past end of data".to_string(),
        ));
    }

    String::from_utf8(bytes[data_start..data_start + length].to_vec())
        .map_err(|e| ProviderError::InvalidResponse(format!("string return not utf-8: {}", e)))
}

fn word_as_usize(word: &[u8]) -> Result<usize, ProviderError> {
    // High bytes must be zero for any offset/length we can address.
    if word[..24].iter().any(|b| *b != 0) {
        return Err(ProviderError::InvalidResponse(
            "oversized word in string header".to_string(),
        ));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[24..32]);
    Ok(u64::from_be_bytes(tail) as usize)
}
