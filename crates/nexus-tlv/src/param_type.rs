/// Parameter-type descriptor grammar and value validation.
///
/// Grounded on `src/cfg/nn_cli_param_type.c`/`.h`. Grammar: `name[(range)]`
/// where `name` is one of `string`, `uint`, `int`, `ipv4`, `ipv6`, `ip`,
/// `mac` (case-insensitive) and `range = A[-B]` (a bare `A` means `A-A`).
use std::net::{Ipv4Addr, Ipv6Addr};

/// The validated kind and bounds of a command argument.
///
/// Owns the source descriptor string (e.g. `"uint(1-4094)"`) for
/// diagnostics — error messages quote it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamType {
    pub kind: ParamKind,
    pub descriptor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    String { min: u64, max: u64 },
    UInt { min: u64, max: u64 },
    Int { min: i64, max: i64 },
    IPv4,
    IPv6,
    IP,
    MAC,
    /// `true`/`false`/`on`/`off`/`1`/`0`, case-insensitive. A convenience
    /// wrapper over `UInt{0,1}` rather than its own wire type — it encodes
    /// identically to `uint(0-1)`.
    Bool,
    /// Unrecognized type name — accepts any value.
    Unknown,
}

impl ParamType {
    /// Parse a type descriptor string. Never fails: an unrecognized name
    /// produces `ParamKind::Unknown`, which accepts any value.
    pub fn parse(text: &str) -> ParamType {
        let text = text.trim();
        let (name, range) = match text.find('(') {
            Some(open) if text.ends_with(')') => {
                (&text[..open], Some(&text[open + 1..text.len() - 1]))
            }
            _ => (text, None),
        };

        let kind = match name.to_ascii_lowercase().as_str() {
            "string" => {
                let (min, max) = parse_range_u64(range).unwrap_or((0, 255));
                ParamKind::String { min, max }
            }
            "uint" => {
                let (min, max) = parse_range_u64(range).unwrap_or((0, u32::MAX as u64));
                ParamKind::UInt { min, max }
            }
            "int" => {
                let (min, max) =
                    parse_range_i64(range).unwrap_or((i32::MIN as i64, i32::MAX as i64));
                ParamKind::Int { min, max }
            }
            "ipv4" => ParamKind::IPv4,
            "ipv6" => ParamKind::IPv6,
            "ip" => ParamKind::IP,
            "mac" => ParamKind::MAC,
            "bool" => ParamKind::Bool,
            _ => ParamKind::Unknown,
        };

        ParamType {
            kind,
            descriptor: text.to_string(),
        }
    }

    /// Validate a textual argument against this type. On failure, returns a
    /// short, human-readable reason.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match &self.kind {
            ParamKind::String { min, max } => {
                let len = value.len() as u64;
                if len < *min || len > *max {
                    return Err(format!(
                        "string length {len} out of range [{min}, {max}]"
                    ));
                }
                Ok(())
            }
            ParamKind::UInt { min, max } => {
                if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err("expected an unsigned integer".to_string());
                }
                let n: u64 = value
                    .parse()
                    .map_err(|_| "unsigned integer does not fit in 64 bits".to_string())?;
                if n < *min || n > *max {
                    return Err(format!("value {n} out of range [{min}, {max}]"));
                }
                Ok(())
            }
            ParamKind::Int { min, max } => {
                let (sign, digits) = match value.strip_prefix('-') {
                    Some(rest) => (-1i64, rest),
                    None => (1i64, value),
                };
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err("expected a signed integer".to_string());
                }
                let magnitude: i64 = digits
                    .parse()
                    .map_err(|_| "signed integer does not fit in 64 bits".to_string())?;
                let n = sign * magnitude;
                if n < *min || n > *max {
                    return Err(format!("value {n} out of range [{min}, {max}]"));
                }
                Ok(())
            }
            ParamKind::IPv4 => value
                .parse::<Ipv4Addr>()
                .map(|_| ())
                .map_err(|_| "Invalid IPv4 address format".to_string()),
            ParamKind::IPv6 => value
                .parse::<Ipv6Addr>()
                .map(|_| ())
                .map_err(|_| "Invalid IPv6 address format".to_string()),
            ParamKind::IP => {
                if value.parse::<Ipv4Addr>().is_ok() || value.parse::<Ipv6Addr>().is_ok() {
                    Ok(())
                } else {
                    Err("Invalid IP address format".to_string())
                }
            }
            ParamKind::MAC => validate_mac(value),
            ParamKind::Bool => match as_bool(value) {
                Some(_) => Ok(()),
                None => Err("expected true/false, on/off, or 1/0".to_string()),
            },
            ParamKind::Unknown => Ok(()),
        }
    }
}

/// Maps a textual boolean literal to its `0`/`1` wire encoding.
pub fn as_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn validate_mac(value: &str) -> Result<(), String> {
    let sep = if value.contains(':') {
        ':'
    } else if value.contains('-') {
        '-'
    } else {
        return Err("MAC address must use ':' or '-' separators".to_string());
    };

    let octets: Vec<&str> = value.split(sep).collect();
    if octets.len() != 6 {
        return Err("MAC address must have 6 octets".to_string());
    }
    for octet in &octets {
        if octet.len() != 2 || !octet.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid MAC octet '{octet}'"));
        }
        // separators must be consistent — reject mixed ':'/'-' by
        // requiring every octet came from the single `sep` split above.
        if octet.contains(':') || octet.contains('-') {
            return Err("MAC address separators must be consistent".to_string());
        }
    }
    Ok(())
}

fn parse_range_u64(range: Option<&str>) -> Option<(u64, u64)> {
    let range = range?;
    match range.split_once('-') {
        Some((a, b)) => Some((a.trim().parse().ok()?, b.trim().parse().ok()?)),
        None => {
            let a: u64 = range.trim().parse().ok()?;
            Some((a, a))
        }
    }
}

fn parse_range_i64(range: Option<&str>) -> Option<(i64, i64)> {
    let range = range?;
    // A leading '-' before the dash that separates bounds is ambiguous with
    // a negative lower bound; original grammar only needs positive ranges
    // in practice, so split on the last '-' not at position 0.
    let bytes = range.as_bytes();
    let dash_pos = bytes
        .iter()
        .enumerate()
        .skip(1)
        .find(|&(_, &b)| b == b'-')
        .map(|(i, _)| i);
    match dash_pos {
        Some(i) => {
            let a: i64 = range[..i].trim().parse().ok()?;
            let b: i64 = range[i + 1..].trim().parse().ok()?;
            Some((a, b))
        }
        None => {
            let a: i64 = range.trim().parse().ok()?;
            Some((a, a))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_range_omitted() {
        assert_eq!(
            ParamType::parse("string").kind,
            ParamKind::String { min: 0, max: 255 }
        );
        assert_eq!(
            ParamType::parse("uint").kind,
            ParamKind::UInt {
                min: 0,
                max: u32::MAX as u64
            }
        );
        assert_eq!(
            ParamType::parse("int").kind,
            ParamKind::Int {
                min: i32::MIN as i64,
                max: i32::MAX as i64
            }
        );
    }

    #[test]
    fn bare_bound_means_a_to_a() {
        assert_eq!(
            ParamType::parse("uint(10)").kind,
            ParamKind::UInt { min: 10, max: 10 }
        );
    }

    #[test]
    fn case_insensitive_name() {
        assert_eq!(ParamType::parse("IPv4").kind, ParamKind::IPv4);
        assert_eq!(ParamType::parse("MAC").kind, ParamKind::MAC);
    }

    #[test]
    fn unknown_name_accepts_anything() {
        let pt = ParamType::parse("widget(1-2)");
        assert_eq!(pt.kind, ParamKind::Unknown);
        assert!(pt.validate("anything at all").is_ok());
    }

    #[test]
    fn invalid_ipv4_error_message() {
        let pt = ParamType::parse("ipv4");
        let err = pt.validate("10.0.0.300").unwrap_err();
        assert_eq!(err, "Invalid IPv4 address format");
    }

    #[test]
    fn uint_range_enforced() {
        let pt = ParamType::parse("uint(1-4094)");
        assert!(pt.validate("1").is_ok());
        assert!(pt.validate("4094").is_ok());
        assert!(pt.validate("4095").is_err());
        assert!(pt.validate("-1").is_err());
    }

    #[test]
    fn bool_accepts_word_and_digit_synonyms() {
        let pt = ParamType::parse("bool");
        assert!(pt.validate("true").is_ok());
        assert!(pt.validate("OFF").is_ok());
        assert!(pt.validate("1").is_ok());
        assert!(pt.validate("maybe").is_err());
        assert_eq!(as_bool("On"), Some(true));
        assert_eq!(as_bool("0"), Some(false));
    }

    #[test]
    fn mac_accepts_both_separator_styles() {
        let pt = ParamType::parse("mac");
        assert!(pt.validate("AA:BB:CC:DD:EE:FF").is_ok());
        assert!(pt.validate("AA-BB-CC-DD-EE-FF").is_ok());
        assert!(pt.validate("AA:BB-CC:DD:EE:FF").is_err());
        assert!(pt.validate("AA:BB:CC:DD:EE").is_err());
    }

    #[test]
    fn string_length_bounds() {
        let pt = ParamType::parse("string(1-4)");
        assert!(pt.validate("").is_err());
        assert!(pt.validate("abcd").is_ok());
        assert!(pt.validate("abcde").is_err());
    }

    proptest::proptest! {
        #[test]
        fn uint_validate_never_panics(s in "\\PC*") {
            let pt = ParamType::parse("uint(0-100)");
            let _ = pt.validate(&s);
        }
    }
}
