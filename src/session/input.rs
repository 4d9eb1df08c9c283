//! Abstract input intents delivered by the host adapter.

/// The four keys the search field handles itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIntent {
    /// Activate the highlighted (or first) result.
    Enter,
    /// Release focus without navigating.
    Escape,
    /// Move the cursor to the previous row.
    Up,
    /// Move the cursor to the next row.
    Down,
}

impl KeyIntent {
    /// Translate a DOM-style key code.
    pub fn from_key_code(key_code: u32) -> Option<Self> {
        match key_code {
            13 => Some(Self::Enter),
            27 => Some(Self::Escape),
            38 => Some(Self::Up),
            40 => Some(Self::Down),
            _ => None,
        }
    }
}

/// Direction of a cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    Next,
    Previous,
}

/// A key press anywhere on the page, used for "start typing to search".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageKeystroke {
    pub key_code: u32,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl PageKeystroke {
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            ..Self::default()
        }
    }

    /// Digits, letters and the numpad (key codes 48..=111).
    pub fn is_printable(&self) -> bool {
        (48..112).contains(&self.key_code)
    }

    pub fn has_modifier(&self) -> bool {
        self.alt || self.ctrl || self.meta
    }
}
