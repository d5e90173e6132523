//! Legacy chat formatting codes.
//!
//! Chat messages handed to players carry `§`-prefixed formatting codes. Config
//! files and commands use `&` instead, which gets translated on load.

use once_cell::sync::Lazy;
use regex::Regex;

/// The section sign that prefixes every formatting code on the wire.
pub const COLOR_CHAR: char = '§';

static STRIP_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("(?i)§[0-9a-fk-orx]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCode {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl ColorCode {
    pub fn parse(code: char) -> Option<ColorCode> {
        Some(match code.to_ascii_lowercase() {
            '0' => ColorCode::Black,
            '1' => ColorCode::DarkBlue,
            '2' => ColorCode::DarkGreen,
            '3' => ColorCode::DarkAqua,
            '4' => ColorCode::DarkRed,
            '5' => ColorCode::DarkPurple,
            '6' => ColorCode::Gold,
            '7' => ColorCode::Gray,
            '8' => ColorCode::DarkGray,
            '9' => ColorCode::Blue,
            'a' => ColorCode::Green,
            'b' => ColorCode::Aqua,
            'c' => ColorCode::Red,
            'd' => ColorCode::LightPurple,
            'e' => ColorCode::Yellow,
            'f' => ColorCode::White,
            'k' => ColorCode::Obfuscated,
            'l' => ColorCode::Bold,
            'm' => ColorCode::Strikethrough,
            'n' => ColorCode::Underline,
            'o' => ColorCode::Italic,
            'r' => ColorCode::Reset,
            _ => return None,
        })
    }

    pub fn code(self) -> char {
        use ColorCode::*;
        match self {
            Black => '0',
            DarkBlue => '1',
            DarkGreen => '2',
            DarkAqua => '3',
            DarkRed => '4',
            DarkPurple => '5',
            Gold => '6',
            Gray => '7',
            DarkGray => '8',
            Blue => '9',
            Green => 'a',
            Aqua => 'b',
            Red => 'c',
            LightPurple => 'd',
            Yellow => 'e',
            White => 'f',
            Obfuscated => 'k',
            Bold => 'l',
            Strikethrough => 'm',
            Underline => 'n',
            Italic => 'o',
            Reset => 'r',
        }
    }
}

impl std::fmt::Display for ColorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", COLOR_CHAR, self.code())
    }
}

// `x` starts a hex color sequence (`§x§r§r§g§g§b§b`)
fn is_code_char(c: char) -> bool {
    ColorCode::parse(c).is_some() || c.eq_ignore_ascii_case(&'x')
}

/// Replaces every `alt` character that is directly followed by a valid
/// formatting code with `§`, lowercasing the code. Any other occurrence of
/// `alt` is left alone.
pub fn translate_alternate_color_codes(alt: char, text: &str) -> String {
    let mut translated = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == alt {
            if let Some(&code) = chars.peek() {
                if is_code_char(code) {
                    chars.next();
                    translated.push(COLOR_CHAR);
                    translated.push(code.to_ascii_lowercase());
                    continue;
                }
            }
        }
        translated.push(c);
    }
    translated
}

/// Removes all `§` formatting codes from `text`.
pub fn strip_color(text: &str) -> String {
    STRIP_COLOR_REGEX.replace_all(text, "").into_owned()
}
