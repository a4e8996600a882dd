//! Minimal ABI codec for the fixed Sacco function catalogue.
//!
//! The contract interface is a small, closed set of signatures, so the codec
//! handles exactly the shapes that catalogue needs: 32-byte static words
//! (uint256, address, bool), one dynamic `string` argument, and return data
//! containing static tuples, dynamic strings, and arrays of static elements.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::error::{Result, SaccoError};

const WORD: usize = 32;

/// Compute the 4-byte function selector for a canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Compute the topic0 hash for a canonical event signature
pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// Argument value for a contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// uint256 (also used for smaller integer widths)
    Uint(U256),
    /// address
    Addr(Address),
    /// bool
    Bool(bool),
    /// Dynamic string
    Str(String),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::Str(_))
    }

    fn static_word(&self) -> [u8; 32] {
        let mut word = [0u8; WORD];
        match self {
            Token::Uint(v) => word.copy_from_slice(&v.to_be_bytes::<WORD>()),
            Token::Addr(a) => word[12..].copy_from_slice(a.as_slice()),
            Token::Bool(b) => word[31] = *b as u8,
            Token::Str(_) => unreachable!("dynamic token has no static word"),
        }
        word
    }
}

/// Encode calldata for a canonical signature: selector, heads, then tails
/// for dynamic arguments. Returns a 0x-prefixed hex string.
pub fn encode_call(signature: &str, args: &[Token]) -> String {
    let mut heads: Vec<[u8; WORD]> = Vec::with_capacity(args.len());
    let mut tail: Vec<u8> = Vec::new();
    let head_len = args.len() * WORD;

    for arg in args {
        if arg.is_dynamic() {
            let offset = U256::from(head_len + tail.len());
            let mut word = [0u8; WORD];
            word.copy_from_slice(&offset.to_be_bytes::<WORD>());
            heads.push(word);

            match arg {
                Token::Str(s) => {
                    let bytes = s.as_bytes();
                    let mut len_word = [0u8; WORD];
                    len_word.copy_from_slice(&U256::from(bytes.len()).to_be_bytes::<WORD>());
                    tail.extend_from_slice(&len_word);
                    tail.extend_from_slice(bytes);
                    let padding = (WORD - bytes.len() % WORD) % WORD;
                    tail.extend(std::iter::repeat(0u8).take(padding));
                }
                _ => unreachable!(),
            }
        } else {
            heads.push(arg.static_word());
        }
    }

    let mut data = Vec::with_capacity(4 + head_len + tail.len());
    data.extend_from_slice(&selector(signature));
    for word in &heads {
        data.extend_from_slice(word);
    }
    data.extend_from_slice(&tail);

    format!("0x{}", hex::encode(data))
}

/// Word-indexed reader over ABI-encoded return data.
///
/// All accessors take absolute word indices; [`AbiReader::string`] and
/// [`AbiReader::array`] interpret the addressed head word as a byte offset
/// into the data and resolve it.
#[derive(Debug)]
pub struct AbiReader {
    data: Vec<u8>,
}

impl AbiReader {
    /// Parse 0x-prefixed hex return data
    pub fn from_hex(data: &str) -> Result<Self> {
        let stripped = data.strip_prefix("0x").unwrap_or(data);
        let bytes = hex::decode(stripped)
            .map_err(|e| SaccoError::Abi(format!("invalid hex return data: {}", e)))?;
        Ok(Self { data: bytes })
    }

    /// Number of complete words in the data
    pub fn word_count(&self) -> usize {
        self.data.len() / WORD
    }

    /// Whether the data is empty (e.g. a reverted `eth_call` result)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn word(&self, index: usize) -> Result<&[u8]> {
        let start = index * WORD;
        let end = start + WORD;
        if end > self.data.len() {
            return Err(SaccoError::Abi(format!(
                "word {} out of bounds ({} bytes of return data)",
                index,
                self.data.len()
            )));
        }
        Ok(&self.data[start..end])
    }

    /// Read word `index` as a uint256
    pub fn uint(&self, index: usize) -> Result<U256> {
        Ok(U256::from_be_slice(self.word(index)?))
    }

    /// Read word `index` as a u64, failing if it does not fit
    pub fn u64(&self, index: usize) -> Result<u64> {
        let value = self.uint(index)?;
        u64::try_from(value)
            .map_err(|_| SaccoError::Abi(format!("word {} does not fit in u64", index)))
    }

    /// Read word `index` as a u8, failing if it does not fit
    pub fn u8(&self, index: usize) -> Result<u8> {
        let value = self.uint(index)?;
        u8::try_from(value)
            .map_err(|_| SaccoError::Abi(format!("word {} does not fit in u8", index)))
    }

    /// Read word `index` as a bool
    pub fn bool(&self, index: usize) -> Result<bool> {
        Ok(!self.uint(index)?.is_zero())
    }

    /// Read word `index` as an address (right-aligned 20 bytes)
    pub fn address(&self, index: usize) -> Result<Address> {
        let word = self.word(index)?;
        Ok(Address::from_slice(&word[12..]))
    }

    /// Resolve the head word at `index` as a dynamic string
    pub fn string(&self, index: usize) -> Result<String> {
        let offset = self.byte_offset(index)?;
        let len_word = offset / WORD;
        let len = self.u64(len_word)? as usize;
        let start = (len_word + 1) * WORD;
        let end = start + len;
        if end > self.data.len() {
            return Err(SaccoError::Abi("string exceeds return data".to_string()));
        }
        String::from_utf8(self.data[start..end].to_vec())
            .map_err(|e| SaccoError::Abi(format!("string is not valid utf-8: {}", e)))
    }

    /// Resolve the head word at `index` as an array of static elements.
    /// Returns `(first_element_word, length)`.
    pub fn array(&self, index: usize) -> Result<(usize, usize)> {
        let offset = self.byte_offset(index)?;
        let len_word = offset / WORD;
        let len = self.u64(len_word)? as usize;
        Ok((len_word + 1, len))
    }

    /// A reader scoped to the data starting at `byte_offset`. Dynamic offsets
    /// inside a tuple element are relative to the element start, so decoding
    /// arrays of dynamic tuples re-scopes per element.
    pub fn scoped(&self, byte_offset: usize) -> Result<AbiReader> {
        if byte_offset > self.data.len() {
            return Err(SaccoError::Abi(format!(
                "scope offset {} exceeds {} bytes of return data",
                byte_offset,
                self.data.len()
            )));
        }
        Ok(AbiReader {
            data: self.data[byte_offset..].to_vec(),
        })
    }

    fn byte_offset(&self, index: usize) -> Result<usize> {
        let offset = self.u64(index)? as usize;
        if offset % WORD != 0 || offset >= self.data.len() {
            return Err(SaccoError::Abi(format!(
                "invalid dynamic offset {} at word {}",
                offset, index
            )));
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known ERC-20 selector, pins the keccak slice down
    #[test]
    fn test_selector_known_value() {
        assert_eq!(
            selector("transfer(address,uint256)"),
            [0xa9, 0x05, 0x9c, 0xbb]
        );
    }

    #[test]
    fn test_selectors_are_distinct() {
        assert_ne!(
            selector("purchaseShares(uint256)"),
            selector("depositSavings()")
        );
        assert_eq!(
            event_topic("SharesPurchased(address,uint256,uint256)"),
            event_topic("SharesPurchased(address,uint256,uint256)")
        );
    }

    #[test]
    fn test_encode_static_args() {
        let data = encode_call(
            "requestLoan(uint256,uint256)",
            &[Token::Uint(U256::from(5)), Token::Uint(U256::from(3600))],
        );
        // selector (4 bytes) + two words
        assert_eq!(data.len(), 2 + (4 + 64) * 2);
        assert!(data.starts_with(&format!(
            "0x{}",
            hex::encode(selector("requestLoan(uint256,uint256)"))
        )));
        assert!(data.ends_with(&format!("{:064x}", 3600)));
    }

    #[test]
    fn test_encode_no_args() {
        let data = encode_call("depositSavings()", &[]);
        assert_eq!(data.len(), 2 + 8); // 0x + selector only
    }

    #[test]
    fn test_encode_dynamic_string_roundtrip() {
        let data = encode_call(
            "createProposal(string,uint8)",
            &[
                Token::Str("repair the meeting hall".to_string()),
                Token::Uint(U256::from(0)),
            ],
        );

        // Strip selector and re-read the argument block
        let args_hex = format!("0x{}", &data[10..]);
        let reader = AbiReader::from_hex(&args_hex).unwrap();
        assert_eq!(reader.string(0).unwrap(), "repair the meeting hall");
        assert_eq!(reader.uint(1).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_reader_static_words() {
        let addr = Address::repeat_byte(0x11);
        let mut raw = Vec::new();
        raw.extend_from_slice(&U256::from(42).to_be_bytes::<32>());
        let mut addr_word = [0u8; 32];
        addr_word[12..].copy_from_slice(addr.as_slice());
        raw.extend_from_slice(&addr_word);
        let mut bool_word = [0u8; 32];
        bool_word[31] = 1;
        raw.extend_from_slice(&bool_word);

        let reader = AbiReader::from_hex(&format!("0x{}", hex::encode(raw))).unwrap();
        assert_eq!(reader.word_count(), 3);
        assert_eq!(reader.uint(0).unwrap(), U256::from(42));
        assert_eq!(reader.u64(0).unwrap(), 42);
        assert_eq!(reader.address(1).unwrap(), addr);
        assert!(reader.bool(2).unwrap());
        assert!(reader.bool(0).is_ok());
    }

    #[test]
    fn test_reader_array() {
        // Single return value: uint256[] = [7, 9]
        let mut raw = Vec::new();
        raw.extend_from_slice(&U256::from(0x20).to_be_bytes::<32>());
        raw.extend_from_slice(&U256::from(2).to_be_bytes::<32>());
        raw.extend_from_slice(&U256::from(7).to_be_bytes::<32>());
        raw.extend_from_slice(&U256::from(9).to_be_bytes::<32>());

        let reader = AbiReader::from_hex(&format!("0x{}", hex::encode(raw))).unwrap();
        let (start, len) = reader.array(0).unwrap();
        assert_eq!(len, 2);
        assert_eq!(reader.uint(start).unwrap(), U256::from(7));
        assert_eq!(reader.uint(start + 1).unwrap(), U256::from(9));
    }

    #[test]
    fn test_scoped_reader() {
        // Outer layout: one padding word, then (uint256, string) tuple content
        let mut raw = Vec::new();
        raw.extend_from_slice(&U256::from(99).to_be_bytes::<32>());
        raw.extend_from_slice(&U256::from(7).to_be_bytes::<32>());
        raw.extend_from_slice(&U256::from(0x40).to_be_bytes::<32>());
        raw.extend_from_slice(&U256::from(2).to_be_bytes::<32>());
        let mut text = [0u8; 32];
        text[..2].copy_from_slice(b"ok");
        raw.extend_from_slice(&text);

        let reader = AbiReader::from_hex(&format!("0x{}", hex::encode(raw))).unwrap();
        let scoped = reader.scoped(32).unwrap();
        assert_eq!(scoped.uint(0).unwrap(), U256::from(7));
        assert_eq!(scoped.string(1).unwrap(), "ok");
        assert!(reader.scoped(1000).is_err());
    }

    #[test]
    fn test_reader_out_of_bounds() {
        let reader = AbiReader::from_hex("0x").unwrap();
        assert!(reader.is_empty());
        assert!(reader.uint(0).is_err());
    }

    #[test]
    fn test_reader_rejects_bad_hex() {
        assert!(AbiReader::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_u64_overflow() {
        let raw = U256::MAX.to_be_bytes::<32>();
        let reader = AbiReader::from_hex(&format!("0x{}", hex::encode(raw))).unwrap();
        assert!(reader.u64(0).is_err());
        assert_eq!(reader.uint(0).unwrap(), U256::MAX);
    }
}
