//! # Hex Codec
//!
//! Conversion between hex string literals (`"0x1a"`) and the 16-bit values
//! stored for state codes and entity addresses.
//!
//! Two parsers exist because the two inputs differ:
//!
//! - [`parse_hex`] reads numeric literals as written in documents and request
//!   bodies: `0x`, `0o` and `0b` prefixes select the radix, bare digits are
//!   decimal.
//! - [`parse_hex_address`] reads path parameters, where the `0x` prefix is
//!   optional and the digits are always hexadecimal.
//!
//! Bare digits therefore mean different values in the two places: an entity
//! created with `"EntityHex": "10"` is `0x0a` and is addressed as `/byHex/0a`,
//! not `/byHex/10`. A leading zero does not select octal, so `"010"` is ten.

use crate::domain::errors::RegistryError;
use std::num::IntErrorKind;

/// Parse a numeric literal into a 16-bit value.
pub fn parse_hex(input: &str) -> Result<u16, RegistryError> {
    let trimmed = input.trim();
    let (digits, radix) = split_radix(trimmed);
    parse_digits(input, digits, radix)
}

/// Parse an entity address taken from a URL path (`"1a"` or `"0x1a"`).
pub fn parse_hex_address(input: &str) -> Result<u16, RegistryError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    parse_digits(input, digits, 16)
}

/// Render a value as a prefixed, lowercase, two-digit-minimum hex literal.
///
/// `0x00`..`0xff`, then `0x100` and up.
pub fn format_hex(value: u16) -> String {
    format!("{value:#04x}")
}

/// Normalize any accepted literal to its canonical [`format_hex`] form.
pub fn canonical_hex(input: &str) -> Result<String, RegistryError> {
    parse_hex(input).map(format_hex)
}

fn split_radix(literal: &str) -> (&str, u32) {
    let lower_prefix = literal.get(..2).map(str::to_ascii_lowercase);
    match lower_prefix.as_deref() {
        Some("0x") => (&literal[2..], 16),
        Some("0o") => (&literal[2..], 8),
        Some("0b") => (&literal[2..], 2),
        _ => (literal, 10),
    }
}

fn parse_digits(input: &str, digits: &str, radix: u32) -> Result<u16, RegistryError> {
    if digits.is_empty() {
        return Err(RegistryError::malformed_hex(input, "no digits"));
    }
    // from_str_radix tolerates a leading '+', literals do not
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(RegistryError::malformed_hex(
            input,
            format!("invalid digit for base {radix}"),
        ));
    }
    u16::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => {
            RegistryError::malformed_hex(input, "value does not fit in 16 bits")
        }
        _ => RegistryError::malformed_hex(input, e.to_string()),
    })
}
