//! Short, deterministic identifiers derived from arbitrary strings.
//!
//! This is the same hash the Astro runtime uses (`shorthash`), so identifiers
//! generated here line up with the ones the JavaScript toolchain produces.

const DICTIONARY: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXY";

/// Hashes `text` into a short alphanumeric identifier.
///
/// The output only contains `[0-9a-zA-Z]`; negative hashes get a leading `Z`
/// (which is outside the digit alphabet, so signs never collide).
///
/// # Examples
///
/// ```
/// use mdmod_core::shorthash::shorthash;
///
/// assert_eq!(shorthash("a"), "1A");
/// assert_eq!(shorthash("./hero.png"), shorthash("./hero.png"));
/// assert!(shorthash("./hero.png").chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn shorthash(text: &str) -> String {
    let hash = bitwise(text);
    let base = DICTIONARY.len() as i64;
    let mut integer = i64::from(hash).abs();
    let mut digits = Vec::new();

    while integer >= base {
        digits.push(DICTIONARY[(integer % base) as usize]);
        integer /= base;
    }
    if integer > 0 {
        digits.push(DICTIONARY[integer as usize]);
    }

    let mut out = String::with_capacity(digits.len() + 1);
    if hash < 0 {
        out.push('Z');
    }
    out.extend(digits.iter().rev().map(|&b| b as char));
    out
}

/// 32-bit string hash over UTF-16 code units (`hash * 31 + unit`).
fn bitwise(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}
