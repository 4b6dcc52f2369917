/// Errors from TLV framing and parameter-type validation.
#[derive(Debug, thiserror::Error)]
pub enum TlvError {
    #[error("corrupt frame: element {element_id} claims length {length} but only {remaining} bytes remain")]
    CorruptFrame {
        element_id: u32,
        length: u16,
        remaining: usize,
    },

    #[error("frame too short to hold a group id")]
    TruncatedHeader,

    #[error("value for element {element_id} is not valid {type_name}: {reason}")]
    InvalidValue {
        element_id: u32,
        type_name: &'static str,
        reason: String,
    },
}
