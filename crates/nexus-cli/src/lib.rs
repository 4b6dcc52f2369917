pub mod builtins;
pub mod dispatcher;
pub mod error;
pub mod history;
pub mod matcher;
pub mod pager;
pub mod session;
pub mod telnet;

pub use dispatcher::{dispatch, render, DispatchOutcome, CLI_SENDER_ID, LOCAL_MODULE_ID};
pub use error::{CliError, MatchError};
pub use history::{HistoryEntry, HistoryRing, GLOBAL_HISTORY_CAPACITY, SESSION_HISTORY_CAPACITY};
pub use matcher::{match_line, Matched};
pub use pager::{Page, Pager};
pub use session::{render_prompt, Effect, Session, PROMPT_STACK_DEPTH};
pub use telnet::{LineEvent, TelnetDecoder};
