/// Per-connection telnet session: feeds raw socket bytes into
/// [`nexus_cli::Session`]'s pure state machine and writes back whatever
/// [`nexus_cli::Effect`] it produces.
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use nexus_bus::Bus;
use nexus_cli::{builtins, dispatch, match_line, render, Effect, HistoryRing, Session};
use nexus_tree::ViewTree;

/// `IAC WILL ECHO`, `IAC WILL SUPPRESS_GO_AHEAD` — tells a real telnet
/// client to stop local echo and line buffering so every keystroke reaches
/// us immediately, the way the line editor expects.
const TELNET_NEGOTIATION: [u8; 6] = [255, 251, 1, 255, 251, 3];

pub async fn handle(
    mut stream: TcpStream,
    peer: std::net::SocketAddr,
    bus: Arc<Bus>,
    views: Arc<ViewTree>,
    global_history: Arc<Mutex<HistoryRing>>,
    hostname: String,
) {
    if let Err(err) = stream.write_all(&TELNET_NEGOTIATION).await {
        tracing::debug!(%peer, %err, "telnet negotiation failed");
        return;
    }

    let root_prompt = nexus_cli::render_prompt("{hostname}>", &hostname);
    let mut session = Session::new(peer.ip().to_string(), views.clone(), global_history.clone(), root_prompt.clone());

    if write_str(&mut stream, &root_prompt).await.is_err() {
        return;
    }

    let mut buf = [0u8; 1];
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                tracing::debug!(%peer, %err, "connection read error");
                break;
            }
        };
        if n == 0 {
            break;
        }

        let effect = session.feed_byte(buf[0]);
        match apply_effect(&mut stream, &mut session, effect).await {
            ConnectionAction::Continue => {}
            ConnectionAction::Close => break,
            ConnectionAction::Submit(line) => {
                if handle_submit(
                    &mut stream,
                    &bus,
                    &views,
                    &mut session,
                    &global_history,
                    &hostname,
                    &line,
                )
                .await
                .is_err()
                {
                    break;
                }
            }
        }
    }

    tracing::info!(%peer, "connection closed");
}

enum ConnectionAction {
    Continue,
    Close,
    Submit(String),
}

async fn apply_effect(stream: &mut TcpStream, session: &mut Session, effect: Effect) -> ConnectionAction {
    match effect {
        Effect::None => ConnectionAction::Continue,
        Effect::Echo(text) => {
            if write_str(stream, &text).await.is_err() {
                return ConnectionAction::Close;
            }
            ConnectionAction::Continue
        }
        Effect::Listing(lines) => {
            let mut out = String::from("\r\n");
            for line in &lines {
                out.push_str(line);
                out.push_str("\r\n");
            }
            out.push_str(&session.prompt);
            if write_str(stream, &out).await.is_err() {
                return ConnectionAction::Close;
            }
            ConnectionAction::Continue
        }
        Effect::Redraw { prompt, line } => {
            let out = format!("\r\n{prompt}{line}");
            if write_str(stream, &out).await.is_err() {
                return ConnectionAction::Close;
            }
            ConnectionAction::Continue
        }
        Effect::PagerStart(page) | Effect::PagerPage(page) => {
            let mut out = format!("\r\n{}", page.text);
            if page.has_more {
                out.push_str("\r\n--More--");
            } else {
                out.push_str(&format!("\r\n{}", session.prompt));
            }
            if write_str(stream, &out).await.is_err() {
                return ConnectionAction::Close;
            }
            ConnectionAction::Continue
        }
        Effect::Submit(line) => ConnectionAction::Submit(line),
    }
}

/// A submitted line is either a local built-in (`exit`/`end`/`history`/
/// `show tree`/`?`) or a command matched and dispatched against the
/// current view's tree.
async fn handle_submit(
    stream: &mut TcpStream,
    bus: &Bus,
    views: &ViewTree,
    session: &mut Session,
    global_history: &Mutex<HistoryRing>,
    hostname: &str,
    line: &str,
) -> std::io::Result<()> {
    if builtins::is_builtin(line) {
        match line.trim() {
            builtins::EXIT => {
                if session.has_parent_view() {
                    session.pop_prompt();
                    let out = format!("\r\n{}", session.prompt);
                    return write_str(stream, &out).await;
                }
                let _ = write_str(stream, "\r\n").await;
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "exit"));
            }
            builtins::END => {
                session.pop_to_root();
                let out = format!("\r\n{}", session.prompt);
                return write_str(stream, &out).await;
            }
            _ => {
                let rendered = builtins::run(session, global_history, line).unwrap_or_default();
                let effect = session.begin_output(&rendered);
                write_once(stream, session, effect).await?;
                return Ok(());
            }
        }
    }

    let Some(view) = views.view_find_by_id(session.current_view) else {
        return write_str(stream, &format!("\r\n% Unknown view\r\n{}", session.prompt)).await;
    };
    let root = view.cmd_tree.root();

    match match_line(&view.cmd_tree, root, line) {
        Ok(matched) => {
            let outcome = dispatch(bus, views, session, &matched, hostname).await;
            let effect = render(session, outcome);
            write_once(stream, session, effect).await
        }
        Err(err) => {
            let message = format!("\r\n% {err}\r\n{}", session.prompt);
            write_str(stream, &message).await
        }
    }
}

async fn write_once(stream: &mut TcpStream, session: &Session, effect: Effect) -> std::io::Result<()> {
    match effect {
        Effect::Echo(text) => write_str(stream, &format!("\r\n{text}\r\n{}", session.prompt)).await,
        Effect::PagerStart(page) => {
            let mut out = format!("\r\n{}", page.text);
            out.push_str("\r\n--More--");
            write_str(stream, &out).await
        }
        Effect::Redraw { prompt, line } => write_str(stream, &format!("\r\n{prompt}{line}")).await,
        _ => Ok(()),
    }
}

async fn write_str(stream: &mut TcpStream, text: &str) -> std::io::Result<()> {
    stream.write_all(text.as_bytes()).await
}
