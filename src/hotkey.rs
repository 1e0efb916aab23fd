//! Analyse des raccourcis clavier (« M-1 », « C-S-F10 »)
//! Hotkey parsing ("M-1", "C-S-F10")
//!
//! Les valeurs produites sont celles de Win32 (`MOD_*`, codes de touches
//! virtuelles) pour être passées telles quelles à `RegisterHotKey`.
//! Produced values are the Win32 ones (`MOD_*`, virtual-key codes) so they can
//! be handed to `RegisterHotKey` unchanged.

use std::fmt;
use std::str::FromStr;

/// Modificateurs d'un raccourci (masque de bits Win32)
/// Hotkey modifiers (Win32 bit mask)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const ALT: Self = Self(0x0001);
    pub const CONTROL: Self = Self(0x0002);
    pub const SHIFT: Self = Self(0x0004);
    pub const WIN: Self = Self(0x0008);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Erreurs d'analyse d'un raccourci
/// Hotkey parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("empty hotkey")]
    Empty,
    #[error("unknown modifier `{0}` (expected C, M, S or W)")]
    UnknownModifier(String),
    #[error("modifier `{0}` given twice")]
    DuplicateModifier(String),
    #[error("unsupported key `{0}` (expected 0-9, A-Z or F1-F12)")]
    UnknownKey(String),
}

/// Raccourci global : modificateurs + touche virtuelle
/// Global hotkey: modifiers + virtual key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: u32,
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut parts: Vec<&str> = s.split('-').collect();
        // `split` renvoie toujours au moins un élément
        // `split` always yields at least one item
        let key = parts.pop().unwrap_or_default();

        let mut modifiers = Modifiers::default();
        for part in parts {
            let modifier = match part {
                "C" => Modifiers::CONTROL,
                "M" => Modifiers::ALT,
                "S" => Modifiers::SHIFT,
                "W" => Modifiers::WIN,
                _ => return Err(HotkeyError::UnknownModifier(part.to_string())),
            };
            if modifiers.contains(modifier) {
                return Err(HotkeyError::DuplicateModifier(part.to_string()));
            }
            modifiers.insert(modifier);
        }

        Ok(Self {
            modifiers,
            key: virtual_key(key).ok_or_else(|| HotkeyError::UnknownKey(key.to_string()))?,
        })
    }
}

/// Code de touche virtuelle pour 0-9, A-Z et F1-F12
/// Virtual-key code for 0-9, A-Z and F1-F12
fn virtual_key(key: &str) -> Option<u32> {
    let bytes = key.as_bytes();
    match bytes {
        // '0'..'9' => 0x30..0x39 et 'A'..'Z' => 0x41..0x5A (ASCII)
        [c @ (b'0'..=b'9' | b'A'..=b'Z')] => Some(u32::from(*c)),
        [b'F', rest @ ..] if !rest.is_empty() => {
            let n: u32 = std::str::from_utf8(rest).ok()?.parse().ok()?;
            // VK_F1 = 0x70
            (1..=12).contains(&n).then_some(0x70 + n - 1)
        }
        _ => None,
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, label) in [
            (Modifiers::CONTROL, "C"),
            (Modifiers::ALT, "M"),
            (Modifiers::SHIFT, "S"),
            (Modifiers::WIN, "W"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{label}-")?;
            }
        }
        match self.key {
            0x70..=0x7B => write!(f, "F{}", self.key - 0x70 + 1),
            key => match char::from_u32(key) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "0x{key:02X}"),
            },
        }
    }
}
