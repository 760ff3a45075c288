//! Decoding of ABI-encoded `eth_call` return values.

/// Decodes an ABI-encoded dynamic string from an `eth_call` result payload.
///
/// The payload is a hex string, optionally `0x`-prefixed: a 32-byte offset
/// word, a 32-byte big-endian length word, then the string bytes. The decoded
/// string is truncated at the first NUL byte.
///
/// Malformed payloads (odd length, truncated words, non-hex digits, length
/// words past the payload) are decode failures, never panics.
pub fn decode_abi_string(result: &str) -> anyhow::Result<String> {
    let payload = result.strip_prefix("0x").unwrap_or(result);

    let bytes = hex::decode(payload).map_err(|e| anyhow::anyhow!("invalid hex payload: {e}"))?;

    anyhow::ensure!(
        bytes.len() >= 64,
        "payload shorter than the offset and length words"
    );

    // the offset word is skipped; the length word is big-endian
    let word = &bytes[32..64];

    let len = u64::from_be_bytes(word[24..].try_into()?);
    let data = &bytes[64..];

    anyhow::ensure!(
        word[..24].iter().all(|&b| b == 0) && len <= data.len() as u64,
        "length word exceeds the payload data"
    );

    let decoded = data[..len as usize]
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();

    Ok(decoded)
}
