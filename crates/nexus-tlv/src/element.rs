/// Typed element values, replacing the source's ad-hoc integer/string type
/// punning in the TLV layer.
use std::net::{Ipv4Addr, Ipv6Addr};

/// Reserved element id carrying a session's view-context blob back to the
/// owning module on every command issued from that view, standing in for a
/// process-global "current interface" reference.
pub const VIEW_CONTEXT_ELEMENT_ID: u32 = 0xFFFF_FFFE;

/// A decoded element's value, once a caller has asked for a specific
/// interpretation. `decode` itself never produces these — it is
/// traversal-only — these are helpers callers reach for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    Str(String),
    U32(u32),
    I32(i32),
    IPv4(Ipv4Addr),
    IPv6(Ipv6Addr),
    Mac([u8; 6]),
    Raw(Vec<u8>),
}

/// Read a big-endian `u32` from exactly 4 bytes.
pub fn read_u32(value: &[u8]) -> Option<u32> {
    let arr: [u8; 4] = value.try_into().ok()?;
    Some(u32::from_be_bytes(arr))
}

/// Read a big-endian `i32` from exactly 4 bytes.
pub fn read_i32(value: &[u8]) -> Option<i32> {
    let arr: [u8; 4] = value.try_into().ok()?;
    Some(i32::from_be_bytes(arr))
}

/// Bounded raw-to-string copy (invalid UTF-8 is replaced, never panics).
pub fn read_string(value: &[u8]) -> String {
    String::from_utf8_lossy(value).into_owned()
}

pub fn read_ipv4(value: &[u8]) -> Option<Ipv4Addr> {
    let arr: [u8; 4] = value.try_into().ok()?;
    Some(Ipv4Addr::from(arr))
}

pub fn read_ipv6(value: &[u8]) -> Option<Ipv6Addr> {
    let arr: [u8; 16] = value.try_into().ok()?;
    Some(Ipv6Addr::from(arr))
}

pub fn read_mac(value: &[u8]) -> Option<[u8; 6]> {
    value.try_into().ok()
}

pub fn write_mac(text: &str) -> Option<[u8; 6]> {
    let sep = if text.contains(':') { ':' } else { '-' };
    let mut out = [0u8; 6];
    let parts: Vec<&str> = text.split(sep).collect();
    if parts.len() != 6 {
        return None;
    }
    for (i, p) in parts.iter().enumerate() {
        out[i] = u8::from_str_radix(p, 16).ok()?;
    }
    Some(out)
}
