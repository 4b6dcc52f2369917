/// Per-connection CLI state: line editing, completion, history browsing,
/// the prompt stack, and pager handoff.
use std::sync::{Arc, Mutex};

use nexus_tree::{NodeId, ViewTree, ROOT_VIEW_ID};

use crate::history::{HistoryEntry, HistoryRing, GLOBAL_HISTORY_CAPACITY, SESSION_HISTORY_CAPACITY};
use crate::pager::{Page, Pager};
use crate::telnet::{LineEvent, TelnetDecoder};

pub const PROMPT_STACK_DEPTH: usize = 8;

/// Resolve a view's `{hostname}` placeholder against the process-wide
/// hostname. `%u` placeholders are left alone — those are the target
/// module's responsibility to resolve before it replies.
pub fn render_prompt(template: &str, hostname: &str) -> String {
    template.replace("{hostname}", hostname)
}

/// State kept while the user is mid-`Tab`-cycle through several completion
/// candidates.
#[derive(Debug, Clone)]
struct TabCycle {
    /// The full line as typed, before any completion candidate was applied.
    original_line: String,
    matches: Vec<(String, String)>,
    index: usize,
    /// The line value after the most recently applied candidate — used to
    /// detect "input unchanged" on the next `Tab`.
    applied: String,
}

/// What the caller (the connection task) should do in response to a byte
/// or a dispatched command's reply. Session methods are pure state
/// transitions; rendering the terminal bytes is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Echo these bytes back to the client terminal verbatim.
    Echo(String),
    /// Redraw the prompt and current line buffer.
    Redraw { prompt: String, line: String },
    /// Print these lines (completion table / help listing) above a redraw.
    Listing(Vec<String>),
    /// The user pressed Enter: this line is ready to be matched/dispatched.
    Submit(String),
    /// Begin paging this rendered text.
    PagerStart(Page),
    /// The next page of an active pager.
    PagerPage(Page),
    /// No visible effect.
    None,
}

pub struct Session {
    pub client_ip: String,
    views: Arc<ViewTree>,
    global_history: Arc<Mutex<HistoryRing>>,

    pub current_view: u32,
    pub prompt: String,
    /// (prompt, view-context blob, view to restore on pop) per pushed frame.
    prompt_stack: Vec<(String, Option<Vec<u8>>, u32)>,

    decoder: TelnetDecoder,
    line: String,
    history: HistoryRing,
    history_browse_index: Option<usize>,
    saved_live_line: String,
    tab_cycle: Option<TabCycle>,
    pub pager: Pager,
}

impl Session {
    pub fn new(
        client_ip: impl Into<String>,
        views: Arc<ViewTree>,
        global_history: Arc<Mutex<HistoryRing>>,
        initial_prompt: String,
    ) -> Self {
        Self {
            client_ip: client_ip.into(),
            views,
            global_history,
            current_view: ROOT_VIEW_ID,
            prompt: initial_prompt,
            prompt_stack: Vec::new(),
            decoder: TelnetDecoder::new(),
            line: String::new(),
            history: HistoryRing::new(SESSION_HISTORY_CAPACITY),
            history_browse_index: None,
            saved_live_line: String::new(),
            tab_cycle: None,
            pager: Pager::default(),
        }
    }

    pub fn global_history_capacity() -> usize {
        GLOBAL_HISTORY_CAPACITY
    }

    pub fn session_history(&self) -> &HistoryRing {
        &self.history
    }

    pub fn views(&self) -> &ViewTree {
        &self.views
    }

    /// Push `prompt` onto the stack, bounded at [`PROMPT_STACK_DEPTH`].
    /// Pushing past the bound silently drops the command. `previous_view`
    /// is the view id to restore when this frame is popped — callers must
    /// capture it *before* updating `current_view`.
    pub fn push_prompt(&mut self, new_prompt: String, view_context: Option<Vec<u8>>, previous_view: u32) -> bool {
        if self.prompt_stack.len() >= PROMPT_STACK_DEPTH {
            return false;
        }
        self.prompt_stack.push((
            std::mem::replace(&mut self.prompt, new_prompt),
            view_context,
            previous_view,
        ));
        true
    }

    pub fn pop_prompt(&mut self) -> Option<Vec<u8>> {
        let (prompt, view_context, previous_view) = self.prompt_stack.pop()?;
        self.prompt = prompt;
        self.current_view = previous_view;
        Some(view_context.unwrap_or_default())
    }

    /// The view-context blob of the innermost pushed view, if any — echoed
    /// back to the owning module with every subsequent command issued from
    /// that view.
    pub fn current_view_context(&self) -> Option<&[u8]> {
        self.prompt_stack.last()?.1.as_deref()
    }

    /// Whether any view has been pushed beneath the root — i.e. whether
    /// `exit`/`end` have anywhere left to pop to.
    pub fn has_parent_view(&self) -> bool {
        !self.prompt_stack.is_empty()
    }

    /// Pop every pushed frame, returning to the root view and prompt.
    pub fn pop_to_root(&mut self) {
        while self.pop_prompt().is_some() {}
    }

    fn current_context_root(&self) -> Option<NodeId> {
        self.views
            .view_find_by_id(self.current_view)
            .map(|v| v.cmd_tree.root())
    }

    /// Feed one raw byte from the socket. While the pager is active, bytes
    /// are interpreted by [`Session::feed_pager_byte`] instead.
    pub fn feed_byte(&mut self, byte: u8) -> Effect {
        if self.pager.is_active() {
            return self.feed_pager_byte(byte);
        }

        match self.decoder.feed(byte) {
            LineEvent::Insert(b) => {
                self.line.push(b as char);
                self.exit_tab_cycle_silently();
                Effect::Echo((b as char).to_string())
            }
            LineEvent::Backspace => {
                if self.line.pop().is_some() {
                    self.exit_tab_cycle_silently();
                    Effect::Echo("\u{8} \u{8}".to_string())
                } else {
                    Effect::None
                }
            }
            LineEvent::Commit => self.commit_line(),
            LineEvent::Tab => self.handle_tab(),
            LineEvent::Help => self.handle_help(),
            LineEvent::Cancel => {
                self.line.clear();
                self.exit_tab_cycle_silently();
                self.history_browse_index = None;
                Effect::Redraw {
                    prompt: self.prompt.clone(),
                    line: String::new(),
                }
            }
            LineEvent::EndSession => {
                self.line.clear();
                self.exit_tab_cycle_silently();
                self.history_browse_index = None;
                self.pop_to_root();
                Effect::Redraw {
                    prompt: self.prompt.clone(),
                    line: String::new(),
                }
            }
            LineEvent::HistoryUp => self.browse_history(1),
            LineEvent::HistoryDown => self.browse_history(-1),
            LineEvent::CursorLeft | LineEvent::CursorRight => {
                self.exit_tab_cycle_silently();
                Effect::None
            }
            LineEvent::None => Effect::None,
        }
    }

    fn feed_pager_byte(&mut self, byte: u8) -> Effect {
        match byte {
            b' ' => Effect::PagerPage(self.pager.advance()),
            b'q' | b'Q' => {
                self.pager.stop();
                Effect::Redraw {
                    prompt: self.prompt.clone(),
                    line: String::new(),
                }
            }
            _ => {
                self.pager.stop();
                Effect::Redraw {
                    prompt: self.prompt.clone(),
                    line: String::new(),
                }
            }
        }
    }

    /// Hand a fully rendered reply to the pager, starting pagination if it
    /// overflows one screen.
    pub fn begin_output(&mut self, rendered: &str) -> Effect {
        let page = self.pager.start(rendered);
        if page.has_more {
            Effect::PagerStart(page)
        } else {
            Effect::Echo(page.text)
        }
    }

    fn commit_line(&mut self) -> Effect {
        let line = std::mem::take(&mut self.line);
        self.history_browse_index = None;
        self.exit_tab_cycle_silently();

        if !line.is_empty() && self.history.newest_command() != Some(line.as_str()) {
            let entry = HistoryEntry {
                command: line.clone(),
                timestamp: std::time::SystemTime::now(),
                client_ip: self.client_ip.clone(),
            };
            self.history.push(entry.clone());
            self.global_history.lock().unwrap().push(entry);
        }

        Effect::Submit(line)
    }

    fn browse_history(&mut self, direction: i8) -> Effect {
        let count = self.history.len();
        if count == 0 {
            return Effect::None;
        }
        let current = self.history_browse_index;
        let next = match (current, direction) {
            (None, 1) => {
                self.saved_live_line = self.line.clone();
                Some(0)
            }
            (None, _) => None,
            (Some(i), 1) => Some((i + 1).min(count - 1)),
            (Some(0), -1) => None,
            (Some(i), -1) => Some(i - 1),
            _ => current,
        };
        self.history_browse_index = next;
        self.line = match next {
            None => self.saved_live_line.clone(),
            Some(i) => self
                .history
                .nth_from_newest(i)
                .map(|e| e.command.clone())
                .unwrap_or_default(),
        };
        Effect::Redraw {
            prompt: self.prompt.clone(),
            line: self.line.clone(),
        }
    }

    fn exit_tab_cycle_silently(&mut self) {
        self.tab_cycle = None;
    }

    /// Determine the completion/help context node and, when not listing a
    /// trailing-space context wholesale, the partial-token prefix to match
    /// children against.
    fn completion_context(&self) -> Option<(NodeId, Option<String>)> {
        let root = self.current_context_root()?;
        let view = self.views.view_find_by_id(self.current_view)?;
        let tree = &view.cmd_tree;

        let has_trailing_space = self.line.is_empty() || self.line.ends_with(' ');
        let tokens: Vec<&str> = self.line.split_ascii_whitespace().collect();

        if has_trailing_space {
            let mut node = root;
            for t in &tokens {
                match tree.find_keyword_child(node, t) {
                    Some(k) => node = k,
                    None => break,
                }
            }
            Some((node, None))
        } else if tokens.is_empty() {
            Some((root, Some(String::new())))
        } else {
            let (committed, partial) = tokens.split_at(tokens.len() - 1);
            let partial = partial[0];
            let mut node = root;
            for t in committed {
                match tree.find_keyword_child(node, t) {
                    Some(k) => node = k,
                    None => break,
                }
            }
            Some((node, Some(partial.to_string())))
        }
    }

    fn list_children(&self, node: NodeId) -> Vec<(String, String)> {
        let view = match self.views.view_find_by_id(self.current_view) {
            Some(v) => v,
            None => return Vec::new(),
        };
        let tree = &view.cmd_tree;
        let mut out: Vec<(String, String)> = tree
            .partial_matches(node, "")
            .into_iter()
            .map(|id| {
                let n = tree.get(id).expect("valid child id");
                (n.name.clone(), n.description.clone())
            })
            .collect();
        if let Some(arg) = tree.argument_child(node) {
            let n = tree.get(arg).expect("valid child id");
            out.push((format!("<{}>", n.name), n.description.clone()));
        }
        out
    }

    fn matching_children(&self, node: NodeId, prefix: &str) -> Vec<(String, String)> {
        let view = match self.views.view_find_by_id(self.current_view) {
            Some(v) => v,
            None => return Vec::new(),
        };
        let tree = &view.cmd_tree;
        tree.partial_matches(node, prefix)
            .into_iter()
            .map(|id| {
                let n = tree.get(id).expect("valid child id");
                (n.name.clone(), n.description.clone())
            })
            .collect()
    }

    fn handle_help(&mut self) -> Effect {
        let Some((context, _)) = self.completion_context() else {
            return Effect::None;
        };
        let children = self.list_children(context);
        let lines: Vec<String> = children
            .iter()
            .map(|(name, desc)| format!("{name} - {desc}"))
            .collect();
        Effect::Listing(lines)
    }

    fn handle_tab(&mut self) -> Effect {
        if let Some(cycle) = &mut self.tab_cycle {
            if self.line == cycle.applied {
                cycle.index = (cycle.index + 1) % cycle.matches.len();
                let prefix_len = last_token_len(&cycle.original_line);
                let base = &cycle.original_line[..cycle.original_line.len() - prefix_len];
                let candidate = format!("{base}{} ", cycle.matches[cycle.index].0);
                self.line = candidate.clone();
                cycle.applied = candidate.clone();
                return Effect::Redraw {
                    prompt: self.prompt.clone(),
                    line: candidate,
                };
            }
        }

        let Some((context, prefix)) = self.completion_context() else {
            return Effect::None;
        };

        match prefix {
            None => {
                let children = self.list_children(context);
                let lines: Vec<String> = children
                    .iter()
                    .map(|(name, desc)| format!("{name} - {desc}"))
                    .collect();
                self.tab_cycle = None;
                Effect::Listing(lines)
            }
            Some(prefix) => {
                let matches = self.matching_children(context, &prefix);
                match matches.len() {
                    0 => Effect::None,
                    1 => {
                        let suffix = &matches[0].0[prefix.len()..];
                        self.line.push_str(suffix);
                        self.line.push(' ');
                        self.tab_cycle = None;
                        Effect::Echo(format!("{suffix} "))
                    }
                    _ => {
                        let original_line = self.line.clone();
                        self.tab_cycle = Some(TabCycle {
                            original_line: original_line.clone(),
                            matches: matches.clone(),
                            index: 0,
                            applied: original_line,
                        });
                        let lines: Vec<String> = matches
                            .iter()
                            .map(|(name, desc)| format!("{name} - {desc}"))
                            .collect();
                        Effect::Listing(lines)
                    }
                }
            }
        }
    }
}

fn last_token_len(line: &str) -> usize {
    line.split_ascii_whitespace().last().map(str::len).unwrap_or(0)
}
