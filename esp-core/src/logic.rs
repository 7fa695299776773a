//! Pure Business Logic Functions
//!
//! Farb- und Helligkeitsverläufe für die Demo-Muster der Firmware.
//! Keine Hardware-Dependencies (testbar!)

use rgb::RGB8;

use crate::types::colors;

/// Grundfarben des ersten Testabschnitts (je 1 s)
pub const BASIC_COLORS: [RGB8; 4] = [colors::RED, colors::GREEN, colors::BLUE, colors::WHITE];

/// Akzentfarben der Farbsequenz (je 500 ms)
pub const ACCENT_COLORS: [RGB8; 5] = [
    colors::YELLOW,
    colors::CYAN,
    colors::MAGENTA,
    colors::ORANGE,
    colors::PURPLE,
];

/// Einzelner Farbkanal für Fade- und Atem-Effekte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Primary {
    Red,
    Green,
    Blue,
}

impl Primary {
    pub const ALL: [Primary; 3] = [Primary::Red, Primary::Green, Primary::Blue];

    /// Farbe mit nur diesem Kanal auf `level`
    pub const fn with_level(self, level: u8) -> RGB8 {
        match self {
            Primary::Red => RGB8::new(level, 0, 0),
            Primary::Green => RGB8::new(0, level, 0),
            Primary::Blue => RGB8::new(0, 0, level),
        }
    }
}

/// Farbrad: 0 = Rot → 85 = Grün → 170 = Blau → 255 = Rot
///
/// # Beispiele
///
/// ```
/// # use rgb::RGB8;
/// # use esp_core::logic::wheel;
/// assert_eq!(wheel(0), RGB8::new(255, 0, 0));
/// assert_eq!(wheel(85), RGB8::new(0, 255, 0));
/// assert_eq!(wheel(170), RGB8::new(0, 0, 255));
/// ```
pub const fn wheel(position: u8) -> RGB8 {
    if position < 85 {
        let p = position * 3;
        RGB8::new(255 - p, p, 0)
    } else if position < 170 {
        let p = (position - 85) * 3;
        RGB8::new(0, 255 - p, p)
    } else {
        let p = (position - 170) * 3;
        RGB8::new(p, 0, 255 - p)
    }
}

/// Helligkeit hoch und wieder runter: 0..=255, dann 255..=0
pub fn fade_levels() -> impl Iterator<Item = u8> {
    (0..=u8::MAX).chain((0..=u8::MAX).rev())
}

/// Atem-Effekt in Schritten von `step`: 0, step, ... ≤ 255 und zurück
///
/// `step == 0` wird wie 1 behandelt.
pub fn breath_levels(step: u8) -> impl Iterator<Item = u8> {
    let step = usize::from(step.max(1));
    let up = (0..=u8::MAX).step_by(step);
    let down = (0..=u8::MAX).rev().step_by(step);
    up.chain(down)
}
