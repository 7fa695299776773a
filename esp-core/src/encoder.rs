//! WS2812B Bit-Encoder
//!
//! Übersetzt Pixel-Bytes in Puls-Symbole für das Puls-Peripheral.
//! Die beiden Bit-Templates hängen nur vom Timing und der Tick-Frequenz ab,
//! nie vom Pixel-Inhalt.

use rgb::RGB8;

use crate::types::{BitTiming, ColorOrder, PulseSymbol};

/// Symbole pro Pixel (3 Kanäle * 8 Bit)
pub const SYMBOLS_PER_PIXEL: usize = 24;

/// Rechnet Nanosekunden in Ticks um (kaufmännisch gerundet)
///
/// # Beispiele
///
/// ```
/// # use esp_core::encoder::ns_to_ticks;
/// assert_eq!(ns_to_ticks(350, 10_000_000), 4); // 3,5 Ticks → 4
/// assert_eq!(ns_to_ticks(800, 10_000_000), 8);
/// ```
pub const fn ns_to_ticks(ns: u32, resolution_hz: u32) -> u16 {
    let ticks = (ns as u64 * resolution_hz as u64 + 500_000_000) / 1_000_000_000;
    if ticks > u16::MAX as u64 {
        u16::MAX
    } else {
        ticks as u16
    }
}

/// Encoder für das One-Wire-Protokoll
///
/// Jedes Byte wird MSB-first gesendet, jedes Bit als ein Symbol:
/// - Bit 0 → T0H high, T0L low
/// - Bit 1 → T1H high, T1L low
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitEncoder {
    bit0: PulseSymbol,
    bit1: PulseSymbol,
}

impl BitEncoder {
    pub const fn new(timing: &BitTiming, resolution_hz: u32) -> Self {
        Self {
            bit0: PulseSymbol::high_low(
                ns_to_ticks(timing.t0h_ns, resolution_hz),
                ns_to_ticks(timing.t0l_ns, resolution_hz),
            ),
            bit1: PulseSymbol::high_low(
                ns_to_ticks(timing.t1h_ns, resolution_hz),
                ns_to_ticks(timing.t1l_ns, resolution_hz),
            ),
        }
    }

    /// Template für eine logische 0
    pub const fn bit0(&self) -> PulseSymbol {
        self.bit0
    }

    /// Template für eine logische 1
    pub const fn bit1(&self) -> PulseSymbol {
        self.bit1
    }

    pub const fn symbol(&self, bit: bool) -> PulseSymbol {
        if bit { self.bit1 } else { self.bit0 }
    }

    /// Die 8 Symbole eines Bytes, höchstwertiges Bit zuerst
    pub fn encode_byte(&self, byte: u8) -> impl Iterator<Item = PulseSymbol> + use<> {
        let encoder = *self;
        (0..8u8)
            .rev()
            .map(move |bit| encoder.symbol(byte & (1 << bit) != 0))
    }

    /// Symbolstrom für den ganzen Pixel-Puffer (genau `pixels.len() * 24` Symbole)
    pub fn encode<'a>(
        &self,
        pixels: &'a [RGB8],
        order: ColorOrder,
    ) -> impl Iterator<Item = PulseSymbol> + use<'a> {
        let encoder = *self;
        pixels
            .iter()
            .flat_map(move |&pixel| order.bytes(pixel))
            .flat_map(move |byte| encoder.encode_byte(byte))
    }
}
