/// TLV frame codec.
///
/// Wire layout (big-endian):
/// `u32 group_id` followed by a sequence of `{u32 element_id, u16 length,
/// value}`. A zero-length value marks a bare keyword.
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::element;
use crate::error::TlvError;
use crate::param_type::{ParamKind, ParamType};

/// Whether a bound element on a match path was a literal keyword or a
/// validated argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Keyword,
    Argument,
}

/// One bound element along a matched command path — the unit `encode`
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchElement {
    pub element_id: u32,
    pub kind: ElementKind,
    /// Raw textual value as typed by the user (`None` for keywords).
    pub value: Option<String>,
    /// The argument's declared type, used to choose the wire encoding.
    /// `None` for keywords.
    pub param_type: Option<ParamType>,
}

impl MatchElement {
    pub fn keyword(element_id: u32) -> Self {
        Self {
            element_id,
            kind: ElementKind::Keyword,
            value: None,
            param_type: None,
        }
    }

    pub fn argument(element_id: u32, value: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            element_id,
            kind: ElementKind::Argument,
            value: Some(value.into()),
            param_type: Some(param_type),
        }
    }
}

/// The dispatch target and ordered elements produced by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub module_id: u32,
    pub group_id: u32,
    pub elements: Vec<MatchElement>,
}

/// Encode a matched command into its TLV wire form.
///
/// Unknown or unparseable typed values fall back to a raw copy of the
/// textual value — a defined fallback, not an error.
pub fn encode(result: &MatchResult) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + result.elements.len() * 8);
    out.extend_from_slice(&result.group_id.to_be_bytes());

    for el in &result.elements {
        let value_bytes = encode_value(el);
        out.extend_from_slice(&el.element_id.to_be_bytes());
        let len: u16 = value_bytes.len().try_into().unwrap_or(u16::MAX);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&value_bytes[..len as usize]);
    }
    out
}

fn encode_value(el: &MatchElement) -> Vec<u8> {
    let Some(text) = el.value.as_deref() else {
        return Vec::new();
    };
    let raw = || text.as_bytes().to_vec();

    match el.param_type.as_ref().map(|pt| &pt.kind) {
        Some(ParamKind::String { .. }) => raw(),
        Some(ParamKind::UInt { .. }) => text
            .parse::<u32>()
            .map(|n| n.to_be_bytes().to_vec())
            .unwrap_or_else(|_| raw()),
        Some(ParamKind::Int { .. }) => text
            .parse::<i32>()
            .map(|n| n.to_be_bytes().to_vec())
            .unwrap_or_else(|_| raw()),
        Some(ParamKind::IPv4) => text
            .parse::<Ipv4Addr>()
            .map(|a| a.octets().to_vec())
            .unwrap_or_else(|_| raw()),
        Some(ParamKind::IPv6) => text
            .parse::<Ipv6Addr>()
            .map(|a| a.octets().to_vec())
            .unwrap_or_else(|_| raw()),
        Some(ParamKind::IP) => {
            if let Ok(a) = text.parse::<Ipv4Addr>() {
                a.octets().to_vec()
            } else if let Ok(a) = text.parse::<Ipv6Addr>() {
                a.octets().to_vec()
            } else {
                raw()
            }
        }
        Some(ParamKind::MAC) => element::write_mac(text).map(|m| m.to_vec()).unwrap_or_else(raw),
        Some(ParamKind::Bool) => crate::param_type::as_bool(text)
            .map(|b| (b as u32).to_be_bytes().to_vec())
            .unwrap_or_else(raw),
        Some(ParamKind::Unknown) | None => raw(),
    }
}

/// One raw `(element_id, value)` pair as seen by a decode visitor — no
/// type conversion happens here.
pub trait ElementVisitor {
    fn visit(&mut self, element_id: u32, value: &[u8]);
}

impl<F: FnMut(u32, &[u8])> ElementVisitor for F {
    fn visit(&mut self, element_id: u32, value: &[u8]) {
        self(element_id, value)
    }
}

/// Decode a TLV frame, invoking `visitor` once per element in order.
///
/// Traversal-only: no value is interpreted beyond its raw bytes. An
/// over-length element (length greater than the remaining buffer) aborts
/// the whole decode with [`TlvError::CorruptFrame`] — the elements already
/// seen are *not* delivered to the visitor, since the full frame is
/// validated before any callback fires.
pub fn decode(bytes: &[u8], visitor: &mut dyn ElementVisitor) -> Result<u32, TlvError> {
    if bytes.len() < 4 {
        return Err(TlvError::TruncatedHeader);
    }
    let group_id = u32::from_be_bytes(bytes[0..4].try_into().unwrap());

    let mut elements: Vec<(u32, &[u8])> = Vec::new();
    let mut cursor = 4usize;
    while cursor < bytes.len() {
        if bytes.len() - cursor < 6 {
            return Err(TlvError::CorruptFrame {
                element_id: 0,
                length: 0,
                remaining: bytes.len() - cursor,
            });
        }
        let element_id = u32::from_be_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
        let length = u16::from_be_bytes(bytes[cursor + 4..cursor + 6].try_into().unwrap());
        cursor += 6;
        let remaining = bytes.len() - cursor;
        if length as usize > remaining {
            return Err(TlvError::CorruptFrame {
                element_id,
                length,
                remaining,
            });
        }
        let value = &bytes[cursor..cursor + length as usize];
        elements.push((element_id, value));
        cursor += length as usize;
    }

    for (element_id, value) in elements {
        visitor.visit(element_id, value);
    }
    Ok(group_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param_type::ParamType;

    #[test]
    fn bgp_router_id_encodes_keyword_then_ipv4_argument() {
        // `bgp router-id 1.2.3.4` encodes as one keyword element then one
        // 4-byte IPv4 argument element.
        let result = MatchResult {
            module_id: 4,
            group_id: 900,
            elements: vec![
                MatchElement::keyword(1),
                MatchElement::argument(2, "1.2.3.4", ParamType::parse("ipv4")),
            ],
        };
        let bytes = encode(&result);

        assert_eq!(&bytes[0..4], &900u32.to_be_bytes());
        // keyword element: id=1, len=0
        assert_eq!(&bytes[4..8], &1u32.to_be_bytes());
        assert_eq!(&bytes[8..10], &0u16.to_be_bytes());
        // argument element: id=2, len=4, value=01 02 03 04
        assert_eq!(&bytes[10..14], &2u32.to_be_bytes());
        assert_eq!(&bytes[14..16], &4u16.to_be_bytes());
        assert_eq!(&bytes[16..20], &[1, 2, 3, 4]);
        assert_eq!(bytes.len(), 20);
    }

    #[test]
    fn decode_visits_elements_in_order() {
        let result = MatchResult {
            module_id: 1,
            group_id: 7,
            elements: vec![
                MatchElement::keyword(1),
                MatchElement::argument(2, "42", ParamType::parse("uint")),
            ],
        };
        let bytes = encode(&result);

        let mut seen = Vec::new();
        let group_id = decode(&bytes, &mut |id: u32, value: &[u8]| {
            seen.push((id, value.to_vec()))
        })
        .unwrap();

        assert_eq!(group_id, 7);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (1, Vec::new()));
        assert_eq!(seen[1].0, 2);
        assert_eq!(element::read_u32(&seen[1].1), Some(42));
    }

    #[test]
    fn over_length_element_aborts_without_partial_delivery() {
        let mut bytes = 7u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&1u32.to_be_bytes()); // element_id
        bytes.extend_from_slice(&10u16.to_be_bytes()); // claims 10 bytes
        bytes.extend_from_slice(&[1, 2, 3]); // only 3 remain

        let mut delivered = 0usize;
        let err = decode(&bytes, &mut |_: u32, _: &[u8]| delivered += 1).unwrap_err();
        assert!(matches!(err, TlvError::CorruptFrame { .. }));
        assert_eq!(delivered, 0);
    }

    #[test]
    fn round_trip_modulo_retextualisation() {
        let result = MatchResult {
            module_id: 2,
            group_id: 55,
            elements: vec![
                MatchElement::argument(10, "hello", ParamType::parse("string")),
                MatchElement::argument(11, "10", ParamType::parse("uint")),
                MatchElement::argument(12, "-5", ParamType::parse("int")),
                MatchElement::argument(13, "192.168.1.1", ParamType::parse("ipv4")),
                MatchElement::argument(14, "aa:bb:cc:dd:ee:ff", ParamType::parse("mac")),
            ],
        };
        let bytes = encode(&result);
        let mut values = Vec::new();
        decode(&bytes, &mut |id: u32, v: &[u8]| values.push((id, v.to_vec()))).unwrap();

        assert_eq!(element::read_string(&values[0].1), "hello");
        assert_eq!(element::read_u32(&values[1].1), Some(10));
        assert_eq!(element::read_i32(&values[2].1), Some(-5));
        assert_eq!(
            element::read_ipv4(&values[3].1),
            Some("192.168.1.1".parse().unwrap())
        );
        assert_eq!(
            element::read_mac(&values[4].1),
            Some([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff])
        );
    }

    proptest::proptest! {
        #[test]
        fn decode_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256)) {
            let _ = decode(&bytes, &mut |_: u32, _: &[u8]| {});
        }
    }
}
