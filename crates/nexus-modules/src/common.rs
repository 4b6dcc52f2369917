/// Shared TLV framing helpers for the demo modules' replies.
///
/// A `CLI_RESP` payload is plain UTF-8 text: the dispatcher renders it
/// verbatim, with no further TLV decoding. A `CLI_VIEW_CHG` payload is itself
/// a TLV frame whose leading element is the new prompt string and whose
/// optional [`nexus_tlv::VIEW_CONTEXT_ELEMENT_ID`] element carries the
/// view-context blob the dispatcher echoes back on later commands.
use std::sync::Arc;
use std::time::Duration;

use nexus_bus::{Bus, Mailbox, Message, MessageType, WaitOutcome};
use nexus_tlv::{encode, MatchElement, MatchResult, ParamType, VIEW_CONTEXT_ELEMENT_ID};

pub fn text_reply(sender_module: u32, text: impl Into<String>) -> Message {
    Message::new(MessageType::CliResp, sender_module, text.into().into_bytes())
}

pub fn view_change_reply(sender_module: u32, prompt: &str, context: Option<&str>) -> Message {
    let mut elements = vec![MatchElement::argument(1, prompt, ParamType::parse("string"))];
    if let Some(ctx) = context {
        elements.push(MatchElement::argument(
            VIEW_CONTEXT_ELEMENT_ID,
            ctx,
            ParamType::parse("string"),
        ));
    }
    let body = encode(&MatchResult {
        module_id: 0,
        group_id: 0,
        elements,
    });
    Message::new(MessageType::CliViewChg, sender_module, body)
}

/// Decode an incoming command frame into `(group_id, elements)`, where each
/// element is the raw `(element_id, value)` pair the TLV layer delivers.
pub fn decode_elements(body: &[u8]) -> Result<(u32, Vec<(u32, Vec<u8>)>), nexus_tlv::TlvError> {
    let mut elements = Vec::new();
    let group_id = nexus_tlv::decode(body, &mut |id: u32, value: &[u8]| {
        elements.push((id, value.to_vec()));
    })?;
    Ok((group_id, elements))
}

/// The value tagged with [`VIEW_CONTEXT_ELEMENT_ID`], if the dispatcher
/// echoed one back with this command.
pub fn view_context<'a>(elements: &'a [(u32, Vec<u8>)]) -> Option<&'a [u8]> {
    elements
        .iter()
        .find(|(id, _)| *id == VIEW_CONTEXT_ELEMENT_ID)
        .map(|(_, v)| v.as_slice())
}

/// Drives one module's mailbox, decoding each `CLI` frame and handing
/// `(group_id, elements)` to `handler`, which returns the reply to send
/// back. Mirrors the worker-thread poll loop in `nn_bgp_main.c`/`nn_if_main.c`
/// (1 s timeout, drain-to-empty, re-check shutdown each tick) on top of a
/// `tokio::task` instead of a dedicated OS thread.
pub async fn serve<F>(bus: Arc<Bus>, mailbox: Mailbox, mut handler: F)
where
    F: FnMut(u32, &[(u32, Vec<u8>)]) -> Message,
{
    loop {
        if nexus_bus::shutdown_requested() {
            break;
        }
        if mailbox.wait(Duration::from_secs(1)).await == WaitOutcome::Timeout {
            continue;
        }
        while let Some(req) = mailbox.receive() {
            let body = req.payload.as_bytes();
            match decode_elements(body) {
                Ok((group_id, elements)) => {
                    let reply = handler(group_id, &elements).with_request_id(req.request_id);
                    if let Err(e) = bus.send_response(req.sender_id, reply) {
                        tracing::warn!(%e, "failed to send module reply");
                    }
                }
                Err(e) => {
                    tracing::warn!(%e, group_id = 0, "malformed command frame, dropping");
                }
            }
        }
    }
}
