/// Routes a matched command to its target module over the bus, or to a
/// local built-in, and folds the reply back into session state.
use nexus_bus::{Bus, Message, MessageType};
use nexus_tlv::{encode, MatchResult};
use nexus_tree::ViewTree;

use crate::matcher::Matched;
use crate::session::{render_prompt, Effect, Session};

/// The sender id the CLI front-end stamps on outgoing queries. It need not
/// be a registered module — replies are correlated purely by `request_id`.
pub const CLI_SENDER_ID: u32 = 0;

/// `module_id == 0` on a matched command means "handled locally by the
/// CLI", never sent over the bus.
pub const LOCAL_MODULE_ID: u32 = 0;

pub const DISPATCH_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A local built-in ran; render this text to the client.
    Local(String),
    /// The module replied with body text to show through the pager.
    Reply(String),
    /// The module asked for a view change.
    ViewChanged { prompt: String },
    Timeout,
}

/// Dispatch a matched command. Built-ins are the caller's responsibility
/// to recognize before calling this (module_id would be 0 for them); this
/// function only implements the bus round-trip and the view-change fold.
pub async fn dispatch(
    bus: &Bus,
    views: &ViewTree,
    session: &mut Session,
    matched: &Matched,
    hostname: &str,
) -> DispatchOutcome {
    if matched.module_id == LOCAL_MODULE_ID {
        return DispatchOutcome::Local(String::new());
    }

    let mut elements = matched.elements.clone();
    if let Some(ctx) = session.current_view_context() {
        elements.push(nexus_tlv::MatchElement::argument(
            nexus_tlv::VIEW_CONTEXT_ELEMENT_ID,
            String::from_utf8_lossy(ctx).into_owned(),
            nexus_tlv::ParamType::parse("string"),
        ));
    }
    let result = MatchResult {
        module_id: matched.module_id,
        group_id: matched.group_id,
        elements,
    };
    let msg = Message::new(MessageType::Cli, CLI_SENDER_ID, encode(&result));

    let reply = bus
        .query(CLI_SENDER_ID, matched.module_id, msg, DISPATCH_TIMEOUT_MS)
        .await;

    let Some(reply) = reply else {
        return DispatchOutcome::Timeout;
    };

    match reply.msg_type {
        MessageType::CliViewChg => {
            let body = reply.payload.as_bytes();
            let (new_prompt, view_context) = extract_view_change(body);

            let rendered_prompt = if new_prompt.is_empty() {
                views
                    .view_find_by_id(matched.view_id)
                    .map(|v| render_prompt(&v.prompt_template, hostname))
                    .unwrap_or_else(|| session.prompt.clone())
            } else {
                render_prompt(&new_prompt, hostname)
            };

            let previous_view = session.current_view;
            if matched.view_id != 0 {
                session.current_view = matched.view_id;
            }
            session.push_prompt(rendered_prompt.clone(), view_context, previous_view);
            DispatchOutcome::ViewChanged {
                prompt: rendered_prompt,
            }
        }
        // CLI_RESP, CLI_CONTINUE, and anything else are rendered as a
        // plain reply body.
        _ => DispatchOutcome::Reply(nexus_tlv::element::read_string(reply.payload.as_bytes())),
    }
}

/// Render a dispatch outcome through the session's pager, producing the
/// bytes the connection task should write to the client.
pub fn render(session: &mut Session, outcome: DispatchOutcome) -> Effect {
    match outcome {
        DispatchOutcome::Local(text) => session.begin_output(&text),
        DispatchOutcome::Reply(text) => session.begin_output(&text),
        DispatchOutcome::ViewChanged { prompt } => Effect::Redraw {
            prompt,
            line: String::new(),
        },
        DispatchOutcome::Timeout => {
            session.begin_output("Error: Module timed out or failed to respond.")
        }
    }
}

/// Pulls the new prompt (the leading TLV element's string value — empty if
/// the body is empty/unparseable, in which case the session falls back to
/// the view's own template) and, if present, the view-context blob tagged
/// with [`nexus_tlv::VIEW_CONTEXT_ELEMENT_ID`].
fn extract_view_change(body: &[u8]) -> (String, Option<Vec<u8>>) {
    let mut leading = String::new();
    let mut context = None;
    let mut first = true;
    let _ = nexus_tlv::decode(body, &mut |id: u32, value: &[u8]| {
        if first {
            leading = nexus_tlv::element::read_string(value);
            first = false;
        }
        if id == nexus_tlv::VIEW_CONTEXT_ELEMENT_ID {
            context = Some(value.to_vec());
        }
    });
    (leading, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use nexus_bus::mailbox::WaitOutcome;
    use nexus_bus::Mailbox;
    use nexus_tlv::{ElementKind, MatchElement};
    use nexus_tree::ROOT_VIEW_ID;

    use crate::history::HistoryRing;
    use crate::matcher::Matched;

    const MODULE_BGP: u32 = 4;

    fn empty_matched(module_id: u32, group_id: u32) -> Matched {
        Matched {
            module_id,
            group_id,
            elements: vec![MatchElement {
                element_id: 1,
                kind: ElementKind::Keyword,
                value: None,
                param_type: None,
            }],
            final_node: nexus_tree::NodeId(0),
            view_id: 0,
        }
    }

    fn test_session() -> Session {
        let mut views = ViewTree::new();
        views.view_create(ROOT_VIEW_ID, "user", "host>").unwrap();
        let views = Arc::new(views);
        let history = Arc::new(Mutex::new(HistoryRing::new(200)));
        Session::new("127.0.0.1", views, history, "host>".to_string())
    }

    #[tokio::test]
    async fn dispatches_and_renders_cli_resp() {
        let bus = Arc::new(Bus::new());
        let mailbox = Mailbox::create();
        bus.register(MODULE_BGP, mailbox.clone());

        let responder_bus = bus.clone();
        tokio::spawn(async move {
            if mailbox.wait(Duration::from_secs(1)).await == WaitOutcome::Ready {
                if let Some(req) = mailbox.receive() {
                    let reply = Message::new(MessageType::CliResp, MODULE_BGP, b"router id set".to_vec())
                        .with_request_id(req.request_id);
                    responder_bus.send_response(req.sender_id, reply).unwrap();
                }
            }
        });

        let views = ViewTree::new();
        let mut session = test_session();
        let matched = empty_matched(MODULE_BGP, 900);
        let outcome = dispatch(&bus, &views, &mut session, &matched, "host").await;
        assert_eq!(outcome, DispatchOutcome::Reply("router id set".to_string()));
    }

    #[tokio::test]
    async fn timeout_when_module_never_answers() {
        let bus = Bus::new();
        bus.register(MODULE_BGP, Mailbox::create());
        let views = ViewTree::new();
        let mut session = test_session();
        let matched = empty_matched(MODULE_BGP, 900);

        // A short timeout keeps this test fast; the production constant is
        // only exercised indirectly.
        let msg = Message::new(MessageType::Cli, CLI_SENDER_ID, Vec::<u8>::new());
        let reply = bus.query(CLI_SENDER_ID, MODULE_BGP, msg, 20).await;
        assert!(reply.is_none());

        let outcome = dispatch(&bus, &views, &mut session, &matched, "host").await;
        // The registered-but-silent module still times out on the real call.
        assert_eq!(outcome, DispatchOutcome::Timeout);
    }

    #[test]
    fn local_module_id_short_circuits_without_bus_call() {
        let matched = empty_matched(LOCAL_MODULE_ID, 0);
        assert_eq!(matched.module_id, LOCAL_MODULE_ID);
    }
}

