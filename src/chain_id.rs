//! Chain identifier encodings
//!
//! Chain ids are persisted as `0x`-prefixed lowercase hex and shown to users in
//! decimal. Configurations saved before format validation existed may carry
//! values that are neither, so every conversion here has a verbatim fallback.

/// Largest chain id accepted for a custom network.
pub const MAX_SAFE_CHAIN_ID: u64 = 4_503_599_627_370_476;

/// Endpoint ids longer than this are truncated in error messages.
const MAX_DISPLAY_LEN: usize = 12;
const TRUNCATED_LEN: usize = 9;

/// Numeric base a chain id string is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Hex,
}

impl Radix {
    /// `0x` selects hex; everything else is read as decimal.
    pub fn of(chain_id: &str) -> Self {
        if chain_id.starts_with("0x") {
            Radix::Hex
        } else {
            Radix::Decimal
        }
    }

    pub fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

pub fn is_safe_chain_id(value: u64) -> bool {
    value > 0 && value <= MAX_SAFE_CHAIN_ID
}

/// Parse a chain id with the radix implied by its prefix.
///
/// Returns `None` for empty digit strings, stray characters and anything that
/// overflows `u64`.
pub fn parse(chain_id: &str) -> Option<u64> {
    let radix = Radix::of(chain_id);
    let digits = match radix {
        Radix::Hex => &chain_id[2..],
        Radix::Decimal => chain_id,
    };
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }
    u64::from_str_radix(digits, radix.base()).ok()
}

pub fn to_hex(value: u64) -> String {
    format!("0x{value:x}")
}

/// Decimal form of a persisted chain id, or the input unchanged when it is not
/// a parseable `0x` hex string.
pub fn to_display(chain_id: &str) -> String {
    hex_to_decimal(chain_id).unwrap_or_else(|| chain_id.to_string())
}

/// Decimal digits of a `0x` hex string, `None` when it is not one.
pub fn hex_to_decimal(chain_id: &str) -> Option<String> {
    let digits = chain_id.strip_prefix("0x")?;
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }
    u128::from_str_radix(digits, 16).ok().map(|value| value.to_string())
}

/// Canonical `0x` lowercase hex form of a user-entered chain id.
pub fn canonicalize(display: &str) -> Option<String> {
    let normalized = display.trim().to_lowercase();
    match Radix::of(&normalized) {
        Radix::Hex => Some(normalized),
        Radix::Decimal => parse(&normalized).map(to_hex),
    }
}

/// Shorten long endpoint-reported ids so error messages stay bounded.
pub fn truncate_for_display(value: &str) -> String {
    if value.chars().count() <= MAX_DISPLAY_LEN {
        value.to_string()
    } else {
        let head: String = value.chars().take(TRUNCATED_LEN).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_prefix() {
        assert_eq!(parse("137"), Some(137));
        assert_eq!(parse("0x89"), Some(137));
        assert_eq!(parse("0x"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("+5"), None);
        assert_eq!(parse("99999999999999999999999"), None);
    }

    #[test]
    fn test_display_falls_back_for_legacy_values() {
        assert_eq!(to_display("0x1"), "1");
        assert_eq!(to_display("0xa86a"), "43114");
        assert_eq!(to_display("not-a-hex"), "not-a-hex");
        assert_eq!(to_display("0xzz"), "0xzz");
        assert_eq!(to_display("56"), "56");
        assert_eq!(to_display(""), "");
    }

    #[test]
    fn test_canonicalize_decimal_and_hex() {
        assert_eq!(canonicalize(" 1 ").as_deref(), Some("0x1"));
        assert_eq!(canonicalize("0xAB").as_deref(), Some("0xab"));
        assert_eq!(canonicalize("4503599627370476").as_deref(), Some("0xfffffffffffec"));
        assert_eq!(canonicalize("abc"), None);
    }

    #[test]
    fn test_decimal_round_trip() {
        for decimal in ["1", "10", "137", "43114", "4503599627370476"] {
            let hex = canonicalize(decimal).unwrap();
            assert_eq!(to_display(&hex), decimal);
        }
    }

    #[test]
    fn test_safe_range() {
        assert!(!is_safe_chain_id(0));
        assert!(is_safe_chain_id(1));
        assert!(is_safe_chain_id(MAX_SAFE_CHAIN_ID));
        assert!(!is_safe_chain_id(MAX_SAFE_CHAIN_ID + 1));
    }

    #[test]
    fn test_truncate_for_display() {
        assert_eq!(truncate_for_display("123456789012"), "123456789012");
        assert_eq!(truncate_for_display("1234567890123"), "123456789...");
    }
}
