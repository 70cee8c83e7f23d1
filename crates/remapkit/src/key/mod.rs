//! # Key tokens
//!
//! ## Overview
//!
//! This module contains [KeyToken], the canonical representation of a single keypress, and the
//! code for converting to and from Vim's `<...>` key notation.
//!
//! Every key has exactly one notation. Named keys and modified keys are written inside angle
//! brackets (`<Esc>`, `<C-W>`, `<A-x>`), a literal `<` is written as `<lt>`, and every other
//! character stands for itself.
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MediaKeyCode};
use keyremap::InputKey;

use self::parse::{parse_key_str, parse_macro_str};


pub mod parse;
pub mod tokenizer;

pub use self::tokenizer::Tokenizer;

/// Errors that occur while interpreting key notation.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum KeyError {
    /// The notation doesn't describe a valid key sequence.
    #[error("Invalid key notation: {0:?}")]
    InvalidKey(String),

    /// The notation is empty.
    #[error("Empty key notation")]
    EmptyKey,
}

/// A single keypress.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeyToken {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyToken {
    /// Create a key from a code and modifiers.
    ///
    /// Shift is implied by the character itself for character keys and by [KeyCode::BackTab],
    /// so it gets removed. Control characters are always stored in lowercase.
    pub fn new(mut code: KeyCode, mut modifiers: KeyModifiers) -> Self {
        match code {
            KeyCode::Char(c) => {
                modifiers -= KeyModifiers::SHIFT;

                if modifiers.contains(KeyModifiers::CONTROL) {
                    code = KeyCode::Char(c.to_ascii_lowercase());
                }
            },
            KeyCode::BackTab => {
                modifiers -= KeyModifiers::SHIFT;
            },
            _ => {},
        }

        Self { code, modifiers }
    }

    /// The key that was pressed.
    pub fn code(&self) -> KeyCode {
        self.code
    }

    /// The modifiers held while the key was pressed.
    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    /// Return the character this key types, if it types one.
    pub fn get_char(&self) -> Option<char> {
        if let KeyCode::Char(c) = self.code {
            if self.modifiers.is_empty() {
                return Some(c);
            }
        }

        None
    }

    /// Whether this key is written using `<...>` notation.
    pub fn is_special(&self) -> bool {
        self.get_char().is_none() || self.code == KeyCode::Char('<')
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = {
            let mut mods = String::new();

            if self.modifiers.contains(KeyModifiers::CONTROL) {
                mods.push_str("C-");
            }

            if self.modifiers.contains(KeyModifiers::SHIFT) {
                mods.push_str("S-");
            }

            if self.modifiers.contains(KeyModifiers::ALT) {
                mods.push_str("A-");
            }

            if self.modifiers.contains(KeyModifiers::SUPER) {
                mods.push_str("D-");
            }

            mods
        };

        let named = |f: &mut fmt::Formatter<'_>, name: &str| write!(f, "<{mods}{name}>");

        match self.code {
            KeyCode::Left => named(f, "Left"),
            KeyCode::Right => named(f, "Right"),
            KeyCode::Up => named(f, "Up"),
            KeyCode::Down => named(f, "Down"),
            KeyCode::Backspace => named(f, "BS"),
            KeyCode::Enter => named(f, "CR"),
            KeyCode::Home => named(f, "Home"),
            KeyCode::End => named(f, "End"),
            KeyCode::PageUp => named(f, "PageUp"),
            KeyCode::PageDown => named(f, "PageDown"),
            KeyCode::Null => named(f, "Nul"),
            KeyCode::Esc => named(f, "Esc"),
            KeyCode::Delete => named(f, "Del"),
            KeyCode::Insert => named(f, "Insert"),
            KeyCode::CapsLock => named(f, "CapsLock"),
            KeyCode::ScrollLock => named(f, "ScrollLock"),
            KeyCode::NumLock => named(f, "NumLock"),
            KeyCode::PrintScreen => named(f, "PrintScreen"),
            KeyCode::Pause => named(f, "Pause"),
            KeyCode::Menu => named(f, "Menu"),
            KeyCode::Tab => named(f, "Tab"),
            KeyCode::BackTab => write!(f, "<S-{mods}Tab>"),
            KeyCode::F(n) => named(f, format!("F{n}").as_str()),
            KeyCode::Char(c) => {
                if self.modifiers.is_empty() {
                    return match c {
                        '<' => write!(f, "<lt>"),
                        '\n' => write!(f, "<NL>"),
                        ' ' => write!(f, " "),
                        c => write!(f, "{c}"),
                    };
                }

                match c {
                    ' ' => named(f, "Space"),
                    '<' => named(f, "lt"),
                    '\n' => named(f, "NL"),
                    '4' if self.modifiers == KeyModifiers::CONTROL => named(f, "\\"),
                    '5' if self.modifiers == KeyModifiers::CONTROL => named(f, "]"),
                    '6' if self.modifiers == KeyModifiers::CONTROL => named(f, "^"),
                    '7' if self.modifiers == KeyModifiers::CONTROL => named(f, "_"),
                    c if self.modifiers.contains(KeyModifiers::CONTROL) => {
                        named(f, c.to_uppercase().to_string().as_str())
                    },
                    c => named(f, c.to_string().as_str()),
                }
            },
            KeyCode::Media(mc) => {
                let name = match mc {
                    MediaKeyCode::PlayPause => "MediaPlayPause",
                    MediaKeyCode::Play => "MediaPlay",
                    MediaKeyCode::Pause => "MediaPause",
                    MediaKeyCode::Reverse => "MediaReverse",
                    MediaKeyCode::Stop => "MediaStop",
                    MediaKeyCode::FastForward => "MediaFastForward",
                    MediaKeyCode::Rewind => "MediaRewind",
                    MediaKeyCode::TrackNext => "MediaTrackNext",
                    MediaKeyCode::TrackPrevious => "MediaTrackPrevious",
                    MediaKeyCode::Record => "MediaRecord",
                    MediaKeyCode::LowerVolume => "MediaVolumeDown",
                    MediaKeyCode::RaiseVolume => "MediaVolumeUp",
                    MediaKeyCode::MuteVolume => "MediaVolumeMute",
                };

                named(f, name)
            },
            KeyCode::Modifier(mc) => write!(f, "<{mods}{mc:?}>"),
            KeyCode::KeypadBegin => named(f, "kBegin"),
        }
    }
}

impl FromStr for KeyToken {
    type Err = KeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(KeyError::EmptyKey);
        } else if let Ok((_, key)) = parse_key_str(input) {
            return Ok(key);
        } else {
            return Err(KeyError::InvalidKey(input.to_string()));
        }
    }
}

impl InputKey for KeyToken {
    type Error = KeyError;

    fn from_macro_str(input: &str) -> Result<Vec<Self>, KeyError> {
        if input.is_empty() {
            return Err(KeyError::EmptyKey);
        } else if let Ok((_, keys)) = parse_macro_str(input) {
            return Ok(keys);
        } else {
            return Err(KeyError::InvalidKey(input.to_string()));
        }
    }
}

impl From<KeyCode> for KeyToken {
    fn from(code: KeyCode) -> Self {
        KeyToken::new(code, KeyModifiers::NONE)
    }
}

impl From<KeyEvent> for KeyToken {
    fn from(ke: KeyEvent) -> Self {
        KeyToken::new(ke.code, ke.modifiers)
    }
}

impl From<char> for KeyToken {
    fn from(c: char) -> Self {
        let code = match c {
            '\t' => KeyCode::Tab,
            '\r' => KeyCode::Enter,
            '\u{1B}' => KeyCode::Esc,
            '\u{08}' | '\u{7F}' => KeyCode::Backspace,
            '\0' => KeyCode::Null,
            c => KeyCode::Char(c),
        };

        KeyToken::from(code)
    }
}
