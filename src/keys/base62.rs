//! Base62 encoding
//!
//! Alphabet order is digits, then uppercase, then lowercase, so encoded
//! strings of equal length sort the same way as the integers they encode.

/// The 62-symbol alphabet
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encode a non-negative integer, most significant symbol first
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// The symbol at `index` (0..62)
pub fn symbol(index: usize) -> char {
    ALPHABET[index % ALPHABET.len()] as char
}
