//! Key descriptions and keyboard layouts.

use crate::components::PanelKind;
use serde::{Deserialize, Serialize};

/// What kind of button a key becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// Single character key.
    Character,
    /// Character key with the wide-key minimum width.
    Wide,
    /// Space bar.
    Space,
    /// Switches between the letter cases.
    ShiftLock,
    /// Back to the lowercase letters.
    #[serde(rename = "abc")]
    Abc,
    /// Switches to the number panel.
    NumLock,
    /// Switches to the symbol panel.
    Symbol,
    /// Submits the typed value.
    Return,
    /// Deletes the last character.
    Backspace,
    /// Hides the keyboard.
    Done,
    /// Empty gap of `width`.
    Spacer,
    /// Anything a layout file names that this build does not know.
    #[serde(other)]
    Unknown,
}

/// One key in a layout row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Button kind.
    #[serde(rename = "type")]
    pub kind: KeyType,
    /// Label (and inserted text for character keys).
    #[serde(default)]
    pub value: String,
    /// Toggle state for shift lock keys.
    #[serde(default)]
    pub on: bool,
    /// Gap width for spacers.
    #[serde(default)]
    pub width: f32,
}

impl Key {
    fn new(kind: KeyType, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            on: false,
            width: 0.0,
        }
    }

    /// Character key.
    pub fn character(value: &str) -> Self {
        Self::new(KeyType::Character, value)
    }

    /// Wide character key.
    pub fn wide(value: &str) -> Self {
        Self::new(KeyType::Wide, value)
    }

    /// Space bar labeled `value`.
    pub fn space(value: &str) -> Self {
        Self::new(KeyType::Space, value)
    }

    /// Shift lock key; `on` marks the uppercase panel's key.
    pub fn shift_lock(value: &str, on: bool) -> Self {
        Self {
            on,
            ..Self::new(KeyType::ShiftLock, value)
        }
    }

    /// Key back to lowercase letters.
    pub fn abc(value: &str) -> Self {
        Self::new(KeyType::Abc, value)
    }

    /// Number panel key.
    pub fn num_lock(value: &str) -> Self {
        Self::new(KeyType::NumLock, value)
    }

    /// Symbol panel key.
    pub fn symbol(value: &str) -> Self {
        Self::new(KeyType::Symbol, value)
    }

    /// Return key.
    pub fn return_key(value: &str) -> Self {
        Self::new(KeyType::Return, value)
    }

    /// Backspace key.
    pub fn backspace(value: &str) -> Self {
        Self::new(KeyType::Backspace, value)
    }

    /// Done key.
    pub fn done(value: &str) -> Self {
        Self::new(KeyType::Done, value)
    }

    /// Empty gap.
    pub fn spacer(width: f32) -> Self {
        Self {
            width,
            ..Self::new(KeyType::Spacer, "")
        }
    }
}

/// Key rows for each of the four panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardLayouts {
    pub lower_case: Vec<Vec<Key>>,
    pub upper_case: Vec<Vec<Key>>,
    pub number: Vec<Vec<Key>>,
    pub symbol: Vec<Vec<Key>>,
}

impl Default for KeyboardLayouts {
    fn default() -> Self {
        Self::qwerty(0.001)
    }
}

fn characters(keys: &str) -> Vec<Key> {
    keys.split_whitespace().map(Key::character).collect()
}

fn wides(keys: &str) -> Vec<Key> {
    keys.split_whitespace().map(Key::wide).collect()
}

impl KeyboardLayouts {
    /// Rows for one panel.
    pub fn for_panel(&self, kind: PanelKind) -> &[Vec<Key>] {
        match kind {
            PanelKind::LowerCase => &self.lower_case,
            PanelKind::UpperCase => &self.upper_case,
            PanelKind::Number => &self.number,
            PanelKind::Symbol => &self.symbol,
        }
    }

    /// The stock QWERTY layout with spacers of `spacer_width`.
    pub fn qwerty(spacer_width: f32) -> Self {
        let letters = |upper: bool| {
            let case = |row: &str| {
                if upper {
                    characters(&row.to_uppercase())
                } else {
                    characters(row)
                }
            };
            let mut third = vec![Key::shift_lock("⇧", upper), Key::spacer(spacer_width)];
            third.extend(case("z x c v b n m"));
            third.extend([Key::spacer(spacer_width), Key::backspace("⇦")]);
            vec![
                case("q w e r t y u i o p"),
                case("a s d f g h j k l"),
                third,
                vec![
                    Key::num_lock("123"),
                    Key::spacer(spacer_width),
                    Key::space("space"),
                    Key::return_key("return"),
                ],
            ]
        };

        let punctuation = |mode: Key| {
            let mut row = vec![mode, Key::spacer(spacer_width)];
            row.extend(wides(". , ? ! '"));
            row.extend([Key::spacer(spacer_width), Key::backspace("⇦")]);
            row
        };
        let bottom = || {
            vec![
                Key::abc("ABC"),
                Key::spacer(spacer_width),
                Key::space("space"),
                Key::return_key("return"),
            ]
        };

        Self {
            lower_case: letters(false),
            upper_case: letters(true),
            number: vec![
                characters("1 2 3 4 5 6 7 8 9 0"),
                characters("- / : ; ( ) $ & @ \""),
                punctuation(Key::symbol("#+=")),
                bottom(),
            ],
            symbol: vec![
                characters("[ ] { } # % ^ * + ="),
                characters("_ \\ | ~ < > € £ ¥ •"),
                punctuation(Key::num_lock("123")),
                bottom(),
            ],
        }
    }
}
