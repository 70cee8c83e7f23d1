//! # Key notation parser
//!
//! Parsers for Vim's key notation. Key names are matched case-insensitively against a fixed set,
//! so `<Esc>`, `<esc>` and `<ESC>` are the same key. Text in angle brackets that isn't a known
//! key, like `<foo>`, is read as the literal characters it contains.
use std::ops::BitOr;

use crossterm::event::{KeyCode, KeyModifiers, MediaKeyCode};

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{anychar, char, digit1, one_of},
    combinator::{eof, map, map_res, value},
    multi::{many0, many1},
    IResult,
};

use super::KeyToken;

/// Names that can appear inside of angle brackets.
pub(crate) const KEY_NAMES: &[&str] = &[
    "Left",
    "Right",
    "Up",
    "Down",
    "Space",
    "Bar",
    "Bslash",
    "lt",
    "Esc",
    "Tab",
    "BS",
    "BackSpace",
    "NL",
    "NewLine",
    "LineFeed",
    "LF",
    "CR",
    "Return",
    "Enter",
    "Nul",
    "PageUp",
    "PageDown",
    "Home",
    "End",
    "Insert",
    "Ins",
    "Delete",
    "Del",
    "Pause",
    "PS",
    "PrintScreen",
    "SysRq",
    "Undo",
    "Help",
    "Menu",
    "CapsLock",
    "ScrollLock",
    "NumLock",
    "MediaPlayPause",
    "MediaPlay",
    "MediaPause",
    "MediaReverse",
    "MediaStop",
    "MediaFastForward",
    "MediaRewind",
    "MediaTrackNext",
    "MediaTrackPrevious",
    "MediaRecord",
    "MediaVolumeUp",
    "MediaVolumeDown",
    "MediaVolumeMute",
];

fn parse_modifier(input: &str) -> IResult<&str, KeyModifiers> {
    alt((
        value(KeyModifiers::ALT, tag_no_case("A-")),
        value(KeyModifiers::ALT, tag_no_case("M-")),
        value(KeyModifiers::CONTROL, tag_no_case("C-")),
        value(KeyModifiers::SHIFT, tag_no_case("S-")),
        value(KeyModifiers::SUPER, tag_no_case("D-")),
    ))(input)
}

fn parse_media(input: &str) -> IResult<&str, KeyCode> {
    let media = alt((
        value(MediaKeyCode::PlayPause, tag_no_case("MediaPlayPause")),
        value(MediaKeyCode::Play, tag_no_case("MediaPlay")),
        value(MediaKeyCode::Pause, tag_no_case("MediaPause")),
        value(MediaKeyCode::Reverse, tag_no_case("MediaReverse")),
        value(MediaKeyCode::Stop, tag_no_case("MediaStop")),
        value(MediaKeyCode::FastForward, tag_no_case("MediaFastForward")),
        value(MediaKeyCode::Rewind, tag_no_case("MediaRewind")),
        value(MediaKeyCode::TrackNext, tag_no_case("MediaTrackNext")),
        value(MediaKeyCode::TrackPrevious, tag_no_case("MediaTrackPrevious")),
        value(MediaKeyCode::Record, tag_no_case("MediaRecord")),
        value(MediaKeyCode::RaiseVolume, tag_no_case("MediaVolumeUp")),
        value(MediaKeyCode::LowerVolume, tag_no_case("MediaVolumeDown")),
        value(MediaKeyCode::MuteVolume, tag_no_case("MediaVolumeMute")),
    ));

    map(media, KeyCode::Media)(input)
}

fn parse_motion_name(input: &str) -> IResult<&str, KeyCode> {
    alt((
        value(KeyCode::Left, tag_no_case("Left")),
        value(KeyCode::Right, tag_no_case("Right")),
        value(KeyCode::Up, tag_no_case("Up")),
        value(KeyCode::Down, tag_no_case("Down")),
        value(KeyCode::PageUp, tag_no_case("PageUp")),
        value(KeyCode::PageDown, tag_no_case("PageDown")),
        value(KeyCode::Home, tag_no_case("Home")),
        value(KeyCode::End, tag_no_case("End")),
    ))(input)
}

fn parse_ascii_name(input: &str) -> IResult<&str, KeyCode> {
    // "Bslash" needs to come before "BS".
    alt((
        value(KeyCode::Char(' '), tag_no_case("Space")),
        value(KeyCode::Char('|'), tag_no_case("Bar")),
        value(KeyCode::Char('\\'), tag_no_case("Bslash")),
        value(KeyCode::Char('<'), tag_no_case("lt")),
    ))(input)
}

fn parse_control_name(input: &str) -> IResult<&str, KeyCode> {
    alt((
        value(KeyCode::Esc, tag_no_case("Esc")),
        value(KeyCode::Tab, tag_no_case("Tab")),
        value(KeyCode::Backspace, tag_no_case("BackSpace")),
        value(KeyCode::Backspace, tag_no_case("BS")),
        value(KeyCode::Char('\n'), tag_no_case("NewLine")),
        value(KeyCode::Char('\n'), tag_no_case("NL")),
        value(KeyCode::Char('\n'), tag_no_case("LineFeed")),
        value(KeyCode::Char('\n'), tag_no_case("LF")),
        value(KeyCode::Enter, tag_no_case("CR")),
        value(KeyCode::Enter, tag_no_case("Return")),
        value(KeyCode::Enter, tag_no_case("Enter")),
        value(KeyCode::Null, tag_no_case("Nul")),
    ))(input)
}

fn parse_editing_name(input: &str) -> IResult<&str, KeyCode> {
    alt((
        value(KeyCode::Insert, tag_no_case("Insert")),
        value(KeyCode::Insert, tag_no_case("Ins")),
        value(KeyCode::Delete, tag_no_case("Delete")),
        value(KeyCode::Delete, tag_no_case("Del")),
        value(KeyCode::Pause, tag_no_case("Pause")),
        value(KeyCode::PrintScreen, tag_no_case("PrintScreen")),
        value(KeyCode::PrintScreen, tag_no_case("PS")),
        value(KeyCode::PrintScreen, tag_no_case("SysRq")),
        value(KeyCode::F(14), tag_no_case("Undo")),
        value(KeyCode::F(15), tag_no_case("Help")),
        value(KeyCode::Menu, tag_no_case("Menu")),
        value(KeyCode::CapsLock, tag_no_case("CapsLock")),
        value(KeyCode::ScrollLock, tag_no_case("ScrollLock")),
        value(KeyCode::NumLock, tag_no_case("NumLock")),
    ))(input)
}

fn parse_keyname(input: &str) -> IResult<&str, KeyCode> {
    alt((
        parse_motion_name,
        parse_ascii_name,
        parse_control_name,
        parse_editing_name,
        parse_media,
    ))(input)
}

fn parse_base10_u8(input: &str) -> Result<u8, std::num::ParseIntError> {
    input.parse::<u8>()
}

fn parse_function(input: &str) -> IResult<&str, KeyCode> {
    let (input, _) = one_of("Ff")(input)?;
    let (input, n) = map_res(digit1, parse_base10_u8)(input)?;

    Ok((input, KeyCode::F(n)))
}

fn parse_anychar(input: &str) -> IResult<&str, KeyCode> {
    map(anychar, KeyCode::Char)(input)
}

/// Parse a single character that stands for itself.
pub fn parse_simple(input: &str) -> IResult<&str, KeyToken> {
    map(anychar, KeyToken::from)(input)
}

/// Parse a key written inside of angle brackets, like `<Esc>` or `<C-W>`.
///
/// A single character is only accepted inside of the brackets when it has modifiers.
pub fn parse_special(input: &str) -> IResult<&str, KeyToken> {
    let (input, _) = char('<')(input)?;
    let (input, m) = many0(parse_modifier)(input)?;
    let (input, mut k) = if m.is_empty() {
        alt((parse_keyname, parse_function))(input)?
    } else {
        alt((parse_keyname, parse_function, parse_anychar))(input)?
    };
    let (input, _) = char('>')(input)?;

    let mut m = m.into_iter().fold(KeyModifiers::NONE, BitOr::bitor);

    if let KeyCode::Char(c) = k {
        if m.contains(KeyModifiers::CONTROL) {
            // Terminals report these control characters as other keys.
            let key = match c.to_ascii_lowercase() {
                'i' if m == KeyModifiers::CONTROL => KeyToken::from(KeyCode::Tab),
                'm' if m == KeyModifiers::CONTROL => KeyToken::from(KeyCode::Enter),
                '[' if m == KeyModifiers::CONTROL => KeyToken::from(KeyCode::Esc),
                'j' => KeyToken::new(KeyCode::Char('\n'), m - KeyModifiers::CONTROL),
                '\\' => KeyToken::new(KeyCode::Char('4'), m),
                ']' => KeyToken::new(KeyCode::Char('5'), m),
                '^' => KeyToken::new(KeyCode::Char('6'), m),
                '_' => KeyToken::new(KeyCode::Char('7'), m),
                '@' => KeyToken::new(KeyCode::Char(' '), m),
                c => KeyToken::new(KeyCode::Char(c), m),
            };

            return Ok((input, key));
        }

        if m.contains(KeyModifiers::SHIFT) {
            k = KeyCode::Char(c.to_ascii_uppercase());
        }

        if m.contains(KeyModifiers::ALT) && c.is_uppercase() {
            m |= KeyModifiers::SHIFT;
        }
    } else if k == KeyCode::Tab && m == KeyModifiers::SHIFT {
        return Ok((input, KeyToken::from(KeyCode::BackTab)));
    }

    return Ok((input, KeyToken::new(k, m)));
}

fn parse_key(input: &str) -> IResult<&str, KeyToken> {
    alt((parse_special, parse_simple))(input)
}

/// Parse a string containing exactly one key.
pub fn parse_key_str(input: &str) -> IResult<&str, KeyToken> {
    let (input, res) = parse_key(input)?;
    let (input, _) = eof(input)?;

    Ok((input, res))
}

/// Parse a string containing one or more keys.
pub fn parse_macro_str(input: &str) -> IResult<&str, Vec<KeyToken>> {
    let (input, res) = many1(parse_key)(input)?;
    let (input, _) = eof(input)?;

    Ok((input, res))
}

/// Parse the keys for one side of a remapping.
///
/// In addition to normal key notation, `<Leader>` is replaced with `leader`, and `<Nop>`
/// produces no keys at all.
pub fn parse_mapping_str<'a>(
    input: &'a str,
    leader: &[KeyToken],
) -> IResult<&'a str, Vec<KeyToken>> {
    let parse_leader = |i: &'a str| -> IResult<&'a str, Vec<KeyToken>> {
        value(leader.to_vec(), tag_no_case("<Leader>"))(i)
    };
    let parse_nop = value(Vec::<KeyToken>::new(), tag_no_case("<Nop>"));
    let parse_one = map(parse_key, |k| vec![k]);

    let (input, res) = many1(alt((parse_leader, parse_nop, parse_one)))(input)?;
    let (input, _) = eof(input)?;

    Ok((input, res.into_iter().flatten().collect()))
}
