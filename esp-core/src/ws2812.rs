//! WS2812B Treiber
//!
//! Besitzt den Pixel-Puffer und den Sendekanal. Alle Operationen sind
//! synchron und nehmen `&mut self` - es gibt kein internes Locking, der
//! besitzende Task serialisiert die Aufrufe.

use embedded_hal::delay::DelayNs;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::encoder::BitEncoder;
use crate::traits::{LedError, PulseChannel, PulsePeripheral};
use crate::types::{LedConfig, colors};

/// WS2812B Treiber für `N` LEDs
///
/// # Trait-basierte Abstraktion
/// - `P: PulsePeripheral` - RMT im Production-Code, Mock in Tests
/// - `D: DelayNs` - blockierendes Delay für die Reset/Latch-Zeit
pub struct Ws2812Driver<P: PulsePeripheral, D: DelayNs, const N: usize> {
    peripheral: P,
    delay: D,
    channel: Option<P::Channel>,
    pixels: [RGB8; N],
    encoder: BitEncoder,
    config: LedConfig,
}

impl<P: PulsePeripheral, D: DelayNs, const N: usize> Ws2812Driver<P, D, N> {
    /// Erstellt den Treiber (ohne Hardware-Zugriff)
    pub fn new(peripheral: P, delay: D, config: LedConfig) -> Self {
        Self {
            peripheral,
            delay,
            channel: None,
            pixels: [colors::BLACK; N],
            encoder: BitEncoder::new(&config.timing, config.channel.resolution_hz),
            config,
        }
    }

    /// Beansprucht den Sendekanal auf `pin` und aktiviert ihn
    ///
    /// Ein zweiter Aufruf nach Erfolg ist ein No-Op (mit Warnung).
    ///
    /// # Fehlerbehandlung
    /// `LedError::ResourceUnavailable` wenn Peripheral oder Pin belegt sind.
    pub fn init(&mut self, pin: u8) -> Result<(), LedError> {
        if self.channel.is_some() {
            warn!("WS2812B: Driver already initialized");
            return Ok(());
        }

        info!(
            "WS2812B: Initializing on GPIO{} ({} Hz resolution)",
            pin,
            self.config.channel.resolution_hz
        );

        let mut channel = self
            .peripheral
            .claim(pin, &self.config.channel)
            .inspect_err(|e| error!("WS2812B: Failed to claim pulse channel: {}", e))?;

        if let Err(e) = channel.enable() {
            error!("WS2812B: Failed to enable pulse channel: {}", e);
            self.peripheral.release(channel);
            return Err(e);
        }

        self.pixels = [colors::BLACK; N];
        self.channel = Some(channel);
        info!("WS2812B: Driver initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.channel.is_some()
    }

    /// Anzahl der LEDs
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Setzt ein einzelnes Pixel (nur Puffer, kein Hardware-Zugriff)
    pub fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<(), LedError> {
        self.ensure_initialized()?;

        let Some(pixel) = self.pixels.get_mut(index) else {
            error!("WS2812B: Pixel index out of range: {}", index);
            return Err(LedError::OutOfRange);
        };
        *pixel = color;
        Ok(())
    }

    /// Setzt alle Pixel auf eine Farbe
    pub fn set_all_pixels(&mut self, color: RGB8) -> Result<(), LedError> {
        self.ensure_initialized()?;
        self.pixels.fill(color);
        Ok(())
    }

    /// Alle Pixel schwarz
    pub fn clear(&mut self) -> Result<(), LedError> {
        self.set_all_pixels(colors::BLACK)
    }

    pub fn pixel(&self, index: usize) -> Option<RGB8> {
        self.pixels.get(index).copied()
    }

    pub fn pixels(&self) -> &[RGB8; N] {
        &self.pixels
    }

    /// Sendet den Puffer an die LEDs
    ///
    /// Kodiert jeden Kanal MSB-first, sendet genau einmal und wartet danach
    /// die Reset-Zeit ab, damit die LEDs die Daten übernehmen.
    ///
    /// # Fehlerbehandlung
    /// `LedError::TransmitFailed` wenn die Hardware ablehnt. Der Pixel-Puffer
    /// bleibt in jedem Fall unverändert.
    pub fn refresh(&mut self) -> Result<(), LedError> {
        let Some(channel) = self.channel.as_mut() else {
            error!("WS2812B: Driver not initialized");
            return Err(LedError::NotInitialized);
        };

        channel
            .transmit(self.encoder.encode(&self.pixels, self.config.order))
            .inspect_err(|e| error!("WS2812B: Transmit failed: {}", e))?;

        self.delay.delay_us(self.config.timing.reset_us);
        Ok(())
    }

    /// Deaktiviert den Kanal und gibt ihn frei (No-Op ohne `init()`)
    pub fn deinit(&mut self) {
        let Some(mut channel) = self.channel.take() else {
            return;
        };

        info!("WS2812B: Deinitializing driver");
        channel.disable();
        self.peripheral.release(channel);
        info!("WS2812B: Driver deinitialized");
    }

    fn ensure_initialized(&self) -> Result<(), LedError> {
        if self.channel.is_none() {
            error!("WS2812B: Driver not initialized");
            return Err(LedError::NotInitialized);
        }
        Ok(())
    }
}

impl<P: PulsePeripheral, D: DelayNs, const N: usize> SmartLedsWrite for Ws2812Driver<P, D, N> {
    type Error = LedError;
    type Color = RGB8;

    /// Übernimmt bis zu `N` Farben aus dem Iterator und sendet sofort
    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.ensure_initialized()?;
        for (pixel, color) in self.pixels.iter_mut().zip(iterator) {
            *pixel = color.into();
        }
        self.refresh()
    }
}
