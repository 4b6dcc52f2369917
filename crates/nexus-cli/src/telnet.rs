/// Byte-at-a-time telnet line discipline: a pure, I/O-free state machine.
/// Keeping this free of any socket access makes it independently testable
/// and reusable from both the live server and from scripted session tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputState {
    Normal,
    Esc,
    Csi,
}

/// What a single decoded byte means to the line editor above this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    Insert(u8),
    Backspace,
    Commit,
    Tab,
    Help,
    /// `Ctrl-C`: cancel the current line.
    Cancel,
    /// `Ctrl-Z`: pop all the way back to the root view.
    EndSession,
    HistoryUp,
    HistoryDown,
    CursorLeft,
    CursorRight,
    /// Consumed with no session-visible effect (IAC sequence, a CSI final
    /// byte we don't recognize, a bare ESC that didn't lead anywhere).
    None,
}

/// Decodes one incoming byte stream into [`LineEvent`]s.
#[derive(Debug)]
pub struct TelnetDecoder {
    state: InputState,
    iac_remaining: u8,
}

impl TelnetDecoder {
    pub fn new() -> Self {
        Self {
            state: InputState::Normal,
            iac_remaining: 0,
        }
    }

    /// Feed one byte, returning what it means to the line editor.
    pub fn feed(&mut self, byte: u8) -> LineEvent {
        if self.iac_remaining > 0 {
            self.iac_remaining -= 1;
            return LineEvent::None;
        }
        if byte == 0xFF {
            self.iac_remaining = 2;
            self.state = InputState::Normal;
            return LineEvent::None;
        }

        match self.state {
            InputState::Normal => match byte {
                0x1B => {
                    self.state = InputState::Esc;
                    LineEvent::None
                }
                0x08 | 0x7F => LineEvent::Backspace,
                b'\r' | b'\n' => LineEvent::Commit,
                b'\t' => LineEvent::Tab,
                b'?' => LineEvent::Help,
                0x03 => LineEvent::Cancel,
                0x1A => LineEvent::EndSession,
                32..=126 => LineEvent::Insert(byte),
                _ => LineEvent::None,
            },
            InputState::Esc => {
                self.state = if byte == b'[' {
                    InputState::Csi
                } else {
                    InputState::Normal
                };
                LineEvent::None
            }
            InputState::Csi => {
                self.state = InputState::Normal;
                match byte {
                    b'A' => LineEvent::HistoryUp,
                    b'B' => LineEvent::HistoryDown,
                    b'C' => LineEvent::CursorRight,
                    b'D' => LineEvent::CursorLeft,
                    _ => LineEvent::None,
                }
            }
        }
    }
}

impl Default for TelnetDecoder {
    fn default() -> Self {
        Self::new()
    }
}
