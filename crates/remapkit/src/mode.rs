//! # Vim modes
//!
//! The modes whose remappings can be configured. Related modes share a single set of
//! remappings, the same way Vim's `:vmap` covers every kind of Visual mode and `:imap` covers
//! both Insert and Replace mode.
use std::fmt;

use keyremap::RemapMode;

/// A Vim editing mode.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum VimMode {
    /// Normal mode.
    #[default]
    Normal,

    /// Insert mode.
    Insert,

    /// Replace mode.
    Replace,

    /// Characterwise Visual mode.
    Visual,

    /// Linewise Visual mode.
    VisualLine,

    /// Blockwise Visual mode.
    VisualBlock,

    /// Select mode.
    Select,

    /// Waiting for the motion or text object given to an operator.
    OperatorPending,

    /// Typing a command on the command line.
    CommandLine,
}

impl VimMode {
    /// The modes that remappings can be configured for.
    pub const CONFIGURABLE: [VimMode; 5] = [
        VimMode::Insert,
        VimMode::Normal,
        VimMode::Visual,
        VimMode::OperatorPending,
        VimMode::CommandLine,
    ];
}

impl RemapMode for VimMode {
    fn remap_scope(&self) -> Self {
        match self {
            VimMode::Replace => VimMode::Insert,
            VimMode::VisualLine | VimMode::VisualBlock | VimMode::Select => VimMode::Visual,
            mode => *mode,
        }
    }
}

impl fmt::Display for VimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VimMode::Normal => "Normal",
            VimMode::Insert => "Insert",
            VimMode::Replace => "Replace",
            VimMode::Visual => "Visual",
            VimMode::VisualLine => "Visual Line",
            VimMode::VisualBlock => "Visual Block",
            VimMode::Select => "Select",
            VimMode::OperatorPending => "Operator-pending",
            VimMode::CommandLine => "Command-line",
        };

        write!(f, "{name}")
    }
}
