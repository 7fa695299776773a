//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung:
//! - **Puls-Peripheral** (RMT) für die WS2812B-Datenleitung
//! - **Netzwerk-Stack** (WiFi-Controller + DHCP) für den Connection-Manager
//!
//! # Implementierungen
//! - **Production:** `esp-firmware` (esp-hal RMT, esp-radio + embassy-net)
//! - **Testing:** Mocks in `esp-tests`

use core::fmt;

use crate::types::{AccessPointInfo, ChannelConfig, NetEvent, PulseSymbol, StationConfig};

// ============================================================================
// Fehler-Typen
// ============================================================================

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    /// `init()` wurde noch nicht (erfolgreich) aufgerufen
    NotInitialized,
    /// Pixel-Index außerhalb des Puffers
    OutOfRange,
    /// Peripheral oder Pin bereits belegt bzw. nicht konfigurierbar
    ResourceUnavailable,
    /// Hardware hat den Transfer abgelehnt oder abgebrochen
    TransmitFailed,
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::NotInitialized => f.write_str("LED driver not initialized"),
            LedError::OutOfRange => f.write_str("pixel index out of range"),
            LedError::ResourceUnavailable => f.write_str("pulse peripheral or pin already claimed"),
            LedError::TransmitFailed => f.write_str("pulse transmission failed"),
        }
    }
}

impl core::error::Error for LedError {}

/// Fehler, die der Netzwerk-Stack meldet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Speicher für Stack-Ressourcen konnte nicht allokiert werden
    NoMemory,
    /// Station-Modus läuft nicht
    NotStarted,
    /// Stack hat die Anfrage abgelehnt
    Rejected,
}

/// Fehler-Typ für WiFi-Manager-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiError {
    /// Leere oder zu lange SSID/Passwort
    InvalidArgument,
    /// Operation im aktuellen Zustand nicht erlaubt (z.B. vor `init()`)
    InvalidState,
    NoMemory,
    /// Sonstiger Fehler des Netzwerk-Stacks
    Stack(DriverError),
}

impl From<DriverError> for WifiError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::NoMemory => WifiError::NoMemory,
            other => WifiError::Stack(other),
        }
    }
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WifiError::InvalidArgument => f.write_str("invalid SSID or password"),
            WifiError::InvalidState => f.write_str("operation invalid in current state"),
            WifiError::NoMemory => f.write_str("out of memory"),
            WifiError::Stack(err) => write!(f, "network stack error: {err:?}"),
        }
    }
}

impl core::error::Error for WifiError {}

// ============================================================================
// Puls-Peripheral (WS2812B Datenleitung)
// ============================================================================

/// Trait für ein Puls-Peripheral (z.B. ESP32 RMT)
///
/// Verwaltet die Sendekanäle. Ein Kanal wird mit `claim()` an einen Pin
/// gebunden und mit `release()` zurückgegeben.
pub trait PulsePeripheral {
    type Channel: PulseChannel;

    /// Bindet einen Sendekanal an `pin`
    ///
    /// # Fehlerbehandlung
    /// `LedError::ResourceUnavailable` wenn Kanal oder Pin bereits belegt sind
    /// oder die Konfiguration nicht umgesetzt werden kann.
    fn claim(&mut self, pin: u8, config: &ChannelConfig) -> Result<Self::Channel, LedError>;

    /// Gibt Kanal und Pin wieder frei
    fn release(&mut self, channel: Self::Channel);
}

/// Trait für einen beanspruchten Sendekanal
pub trait PulseChannel {
    fn enable(&mut self) -> Result<(), LedError>;

    fn disable(&mut self);

    /// Sendet die Symbole genau einmal und wartet bis der Transfer fertig ist
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::TransmitFailed` zurück wenn die Hardware ablehnt
    /// (Kanal belegt, deaktiviert, Puffer zu klein).
    fn transmit<I>(&mut self, symbols: I) -> Result<(), LedError>
    where
        I: IntoIterator<Item = PulseSymbol>;
}

// ============================================================================
// Netzwerk-Stack (WiFi Station)
// ============================================================================

/// Trait für den WiFi-/IP-Stack
///
/// Der Stack liefert Link- und Adress-Events über `next_event()`. Der
/// Aufrufer von `next_event()` ist der Event-Kontext des Managers.
#[allow(async_fn_in_trait)]
pub trait WifiDriver {
    /// Initialisiert Interfaces und Event-Abonnements
    async fn init(&mut self) -> Result<(), DriverError>;

    /// Gibt alle Stack-Ressourcen frei
    async fn deinit(&mut self) -> Result<(), DriverError>;

    /// Startet den Station-Modus (führt zu `NetEvent::StationStarted`)
    async fn start(&mut self) -> Result<(), DriverError>;

    async fn stop(&mut self) -> Result<(), DriverError>;

    fn set_station_config(&mut self, config: &StationConfig) -> Result<(), DriverError>;

    /// Stößt einen Verbindungsaufbau an (Ergebnis kommt als Event)
    fn connect(&mut self) -> Result<(), DriverError>;

    fn disconnect(&mut self) -> Result<(), DriverError>;

    /// Daten des aktuell verbundenen Access Points
    async fn access_point_info(&mut self) -> Option<AccessPointInfo>;

    /// Wartet auf das nächste Link- oder Adress-Event
    async fn next_event(&mut self) -> NetEvent;
}
