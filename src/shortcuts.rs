//! Key identifiers and normalized key bindings.
//!
//! Configuration files name keys as plain strings (`"1"`, `","`, `"F5"`,
//! `"Ctrl+Shift+M"`). They are parsed into a [`KeyBinding`] so that different
//! spellings of the same chord compare equal, both when checking a
//! configuration for collisions and when the host delivers a keystroke.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;

/// Errors that can occur when parsing a key identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The key string is empty
    Empty,
    /// Only modifiers were given (e.g. `"Ctrl+"`)
    MissingKey,
    /// A modifier token was not recognized
    UnknownModifier(String),
    /// The key itself was not recognized
    UnknownKey(String),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "key identifier is empty"),
            Self::MissingKey => write!(f, "key identifier has modifiers but no key"),
            Self::UnknownModifier(token) => write!(f, "unknown modifier '{token}'"),
            Self::UnknownKey(key) => write!(f, "unknown key '{key}'"),
        }
    }
}

impl std::error::Error for KeyParseError {}

/// A key binding (key + modifiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    /// The key code
    pub code: KeyCode,
    /// Modifier keys held with the key
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Create a new key binding.
    ///
    /// Letters combined with Ctrl, Alt or Super are stored lowercase, since
    /// those chords are case-insensitive in every host we deliver to.
    /// Otherwise a shifted letter is stored as the uppercase letter with
    /// Shift held, and a bare uppercase letter means the same chord.
    #[must_use]
    pub fn new(code: KeyCode, mut modifiers: KeyModifiers) -> Self {
        let chorded = modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);
        let code = match code {
            KeyCode::Char(c) if chorded && c.is_ascii_alphabetic() => {
                KeyCode::Char(c.to_ascii_lowercase())
            }
            KeyCode::Char(c)
                if c.is_ascii_alphabetic()
                    && (c.is_ascii_uppercase() || modifiers.contains(KeyModifiers::SHIFT)) =>
            {
                modifiers.insert(KeyModifiers::SHIFT);
                KeyCode::Char(c.to_ascii_uppercase())
            }
            other => other,
        };
        Self { code, modifiers }
    }

    /// Create a key binding from a terminal `KeyEvent`.
    #[must_use]
    pub fn from_event(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }

    /// Parses a key identifier such as `"1"`, `"F5"` or `"Ctrl+Shift+M"`.
    ///
    /// Modifier names are case-insensitive; `+` separates tokens. A literal
    /// plus key is written `"+"` or `"Ctrl++"`.
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }
        if s == "+" {
            return Ok(Self::new(KeyCode::Char('+'), KeyModifiers::NONE));
        }

        let (modifier_part, key_part) = if let Some(prefix) = s.strip_suffix("++") {
            (Some(prefix), "+")
        } else {
            match s.rsplit_once('+') {
                Some((prefix, key)) => (Some(prefix), key),
                None => (None, s),
            }
        };

        let mut modifiers = KeyModifiers::NONE;
        if let Some(prefix) = modifier_part {
            for token in prefix.split('+') {
                let token = token.trim();
                match token.to_ascii_lowercase().as_str() {
                    "ctrl" | "control" | "ctl" => modifiers.insert(KeyModifiers::CONTROL),
                    "alt" | "opt" | "option" => modifiers.insert(KeyModifiers::ALT),
                    "shift" => modifiers.insert(KeyModifiers::SHIFT),
                    "cmd" | "command" | "super" | "meta" | "win" => {
                        modifiers.insert(KeyModifiers::SUPER);
                    }
                    _ => return Err(KeyParseError::UnknownModifier(token.to_string())),
                }
            }
        }

        let key_part = key_part.trim();
        if key_part.is_empty() {
            return Err(KeyParseError::MissingKey);
        }

        Ok(Self::new(parse_key_code(key_part)?, modifiers))
    }
}

/// Maps a key name (without modifiers) to a key code.
fn parse_key_code(key: &str) -> Result<KeyCode, KeyParseError> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = key.to_ascii_lowercase();
    if let Some(number) = lower.strip_prefix('f') {
        if let Ok(n) = number.parse::<u8>() {
            if (1..=24).contains(&n) {
                return Ok(KeyCode::F(n));
            }
        }
    }

    let code = match lower.as_str() {
        "space" => KeyCode::Char(' '),
        "plus" => KeyCode::Char('+'),
        "comma" => KeyCode::Char(','),
        "period" => KeyCode::Char('.'),
        "minus" => KeyCode::Char('-'),
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        _ => return Err(KeyParseError::UnknownKey(key.to_string())),
    };
    Ok(code)
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chorded = self
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SUPER) {
            parts.push("Super".to_string());
        }

        let key = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) if chorded => c.to_ascii_uppercase().to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            other => format!("{other:?}"),
        };
        parts.push(key);

        write!(f, "{}", parts.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_characters() {
        assert_eq!(
            KeyBinding::parse("1").unwrap(),
            KeyBinding::new(KeyCode::Char('1'), KeyModifiers::NONE)
        );
        assert_eq!(
            KeyBinding::parse(",").unwrap(),
            KeyBinding::new(KeyCode::Char(','), KeyModifiers::NONE)
        );
        assert_eq!(
            KeyBinding::parse("+").unwrap(),
            KeyBinding::new(KeyCode::Char('+'), KeyModifiers::NONE)
        );
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(KeyBinding::parse("F5").unwrap().code, KeyCode::F(5));
        assert_eq!(KeyBinding::parse("escape").unwrap().code, KeyCode::Esc);
        assert_eq!(KeyBinding::parse("Space").unwrap().code, KeyCode::Char(' '));
        assert!(matches!(
            KeyBinding::parse("F99"),
            Err(KeyParseError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_parse_modifiers() {
        let binding = KeyBinding::parse("Ctrl+Shift+M").unwrap();
        assert_eq!(binding.code, KeyCode::Char('m'));
        assert!(binding.modifiers.contains(KeyModifiers::CONTROL));
        assert!(binding.modifiers.contains(KeyModifiers::SHIFT));

        let plus = KeyBinding::parse("Ctrl++").unwrap();
        assert_eq!(plus.code, KeyCode::Char('+'));
        assert_eq!(plus.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_chord_spellings_collide() {
        assert_eq!(
            KeyBinding::parse("ctrl+m").unwrap(),
            KeyBinding::parse("Control+M").unwrap()
        );
        // Plain letters stay case-sensitive
        assert_ne!(
            KeyBinding::parse("m").unwrap(),
            KeyBinding::parse("M").unwrap()
        );
    }

    #[test]
    fn test_shifted_letter_spellings_collide() {
        let shifted = KeyBinding::new(KeyCode::Char('M'), KeyModifiers::SHIFT);
        assert_eq!(KeyBinding::parse("Shift+m").unwrap(), shifted);
        assert_eq!(KeyBinding::parse("Shift+M").unwrap(), shifted);
        assert_eq!(KeyBinding::parse("M").unwrap(), shifted);
        assert_eq!(shifted.to_string(), "Shift+M");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(KeyBinding::parse("  "), Err(KeyParseError::Empty));
        assert_eq!(KeyBinding::parse("Ctrl+"), Err(KeyParseError::MissingKey));
        assert_eq!(
            KeyBinding::parse("Hyperdrive+1"),
            Err(KeyParseError::UnknownModifier("Hyperdrive".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for spelling in ["1", ",", "F5", "Ctrl+M", "Ctrl+Alt+Delete", "Space", "Shift+Q"] {
            let binding = KeyBinding::parse(spelling).unwrap();
            let shown = binding.to_string();
            assert_eq!(KeyBinding::parse(&shown).unwrap(), binding, "{spelling}");
        }
    }

    #[test]
    fn test_from_event() {
        let event = KeyEvent::new(KeyCode::Char('K'), KeyModifiers::CONTROL);
        assert_eq!(
            KeyBinding::from_event(event),
            KeyBinding::parse("ctrl+k").unwrap()
        );

        // Terminals report Shift+M as an uppercase char with SHIFT held
        let shifted = KeyEvent::new(KeyCode::Char('M'), KeyModifiers::SHIFT);
        assert_eq!(
            KeyBinding::from_event(shifted),
            KeyBinding::parse("M").unwrap()
        );
        assert_eq!(
            KeyBinding::from_event(shifted),
            KeyBinding::parse("Shift+m").unwrap()
        );
        let unshifted = KeyEvent::new(KeyCode::Char('M'), KeyModifiers::NONE);
        assert_eq!(
            KeyBinding::from_event(unshifted),
            KeyBinding::parse("Shift+M").unwrap()
        );
    }
}
