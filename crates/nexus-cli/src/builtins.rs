/// Local, module-id-0 commands handled entirely within the CLI front-end:
/// `exit`, `?`, history browsing, and a tree dump.
use nexus_tree::{NodeId, ViewTree};

use crate::history::HistoryRing;
use crate::session::Session;

pub const EXIT: &str = "exit";
pub const END: &str = "end";
pub const HISTORY: &str = "history";
pub const HISTORY_ALL: &str = "history all";
pub const SHOW_TREE: &str = "show tree";

/// Whether `line` names a recognized local built-in (dispatch never leaves
/// the CLI process for these).
pub fn is_builtin(line: &str) -> bool {
    matches!(
        line.trim(),
        EXIT | END | HISTORY | HISTORY_ALL | SHOW_TREE | "?"
    )
}

/// Run a recognized built-in, returning the text to show the client.
/// `exit`/`end` are signaled back to the caller via `None` so the
/// connection task can pop the prompt stack or close the session.
pub fn run(
    session: &mut Session,
    global_history: &std::sync::Mutex<HistoryRing>,
    line: &str,
) -> Option<String> {
    match line.trim() {
        EXIT | END => None,
        HISTORY => Some(render_history(session.session_history())),
        HISTORY_ALL => Some(render_history(&global_history.lock().unwrap())),
        SHOW_TREE => Some(render_tree(session)),
        other => Some(format!("% Unknown built-in '{other}'")),
    }
}

fn render_history(ring: &HistoryRing) -> String {
    let mut out = String::new();
    for i in (0..ring.len()).rev() {
        if let Some(entry) = ring.nth_from_newest(i) {
            out.push_str(&format!("{}\t{}\n", entry.client_ip, entry.command));
        }
    }
    if out.is_empty() {
        "% No history\n".to_string()
    } else {
        out
    }
}

/// Dump the current view's command tree — a local admin aid beyond the
/// minimum built-in set.
fn render_tree(session: &Session) -> String {
    render_view_tree(session.views(), session.current_view)
}

fn render_view_tree(views: &ViewTree, view_id: u32) -> String {
    let Some(view) = views.view_find_by_id(view_id) else {
        return "% No such view\n".to_string();
    };
    let mut out = String::new();
    let root = view.cmd_tree.root();
    walk(&view.cmd_tree, root, 0, &mut out);
    if out.is_empty() {
        "(empty)\n".to_string()
    } else {
        out
    }
}

fn walk(tree: &nexus_tree::CommandTree, node: NodeId, depth: usize, out: &mut String) {
    for child in tree.partial_matches(node, "") {
        let n = tree.get(child).expect("valid child id");
        out.push_str(&"  ".repeat(depth));
        out.push_str(&n.name);
        if n.is_end {
            out.push_str(" (*)");
        }
        out.push('\n');
        walk(tree, child, depth + 1, out);
    }
    if let Some(arg) = tree.argument_child(node) {
        let n = tree.get(arg).expect("valid child id");
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("<{}>", n.name));
        if n.is_end {
            out.push_str(" (*)");
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_builtins() {
        assert!(is_builtin("exit"));
        assert!(is_builtin("history all"));
        assert!(is_builtin("?"));
        assert!(!is_builtin("show version"));
    }
}
