//! Core Types für LED-Treiber und WiFi-Manager
//!
//! Datenstrukturen ohne Hardware-Dependencies

use core::net::Ipv4Addr;

use heapless::String;
use rgb::RGB8;

use crate::traits::WifiError;

// ============================================================================
// LED: Farben und Timing
// ============================================================================

/// Vordefinierte Farben (volle Helligkeit)
pub mod colors {
    use rgb::RGB8;

    pub const BLACK: RGB8 = RGB8::new(0, 0, 0);
    pub const RED: RGB8 = RGB8::new(255, 0, 0);
    pub const GREEN: RGB8 = RGB8::new(0, 255, 0);
    pub const BLUE: RGB8 = RGB8::new(0, 0, 255);
    pub const WHITE: RGB8 = RGB8::new(255, 255, 255);
    pub const YELLOW: RGB8 = RGB8::new(255, 255, 0);
    pub const CYAN: RGB8 = RGB8::new(0, 255, 255);
    pub const MAGENTA: RGB8 = RGB8::new(255, 0, 255);
    pub const ORANGE: RGB8 = RGB8::new(255, 165, 0);
    pub const PURPLE: RGB8 = RGB8::new(128, 0, 128);
}

/// Reihenfolge der Farbkanäle auf der Datenleitung
///
/// WS2812B erwartet GRB. Manche Klone (oder falsch bestückte Boards)
/// erwarten RGB - das ist eine feste Eigenschaft der Verdrahtung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    #[default]
    Grb,
    Rgb,
}

impl ColorOrder {
    /// Liefert die drei Bytes eines Pixels in Sende-Reihenfolge
    pub const fn bytes(self, color: RGB8) -> [u8; 3] {
        match self {
            ColorOrder::Grb => [color.g, color.r, color.b],
            ColorOrder::Rgb => [color.r, color.g, color.b],
        }
    }
}

/// Bit-Timing des One-Wire-Protokolls (Nanosekunden bzw. Mikrosekunden)
///
/// T0H+T0L und T1H+T1L sollten etwa gleich lang sein (~1,25 µs beim WS2812B).
/// Das wird nicht geprüft - falsche Werte führen nur zu falschen Farben.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    pub t0h_ns: u32,
    pub t0l_ns: u32,
    pub t1h_ns: u32,
    pub t1l_ns: u32,
    /// Reset/Latch-Zeit nach dem letzten Bit
    pub reset_us: u32,
}

impl BitTiming {
    /// Datenblatt-Werte für WS2812B
    pub const WS2812B: Self = Self {
        t0h_ns: 350,
        t0l_ns: 800,
        t1h_ns: 700,
        t1l_ns: 600,
        reset_us: 280,
    };
}

impl Default for BitTiming {
    fn default() -> Self {
        Self::WS2812B
    }
}

/// Ein Symbol des Puls-Peripherals: zwei Pegel mit Dauer in Ticks
///
/// Entspricht einem RMT-Symbolwort (level0/duration0, level1/duration1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSymbol {
    pub level0: bool,
    pub duration0: u16,
    pub level1: bool,
    pub duration1: u16,
}

impl PulseSymbol {
    /// High-Puls gefolgt von Low-Puls
    pub const fn high_low(high_ticks: u16, low_ticks: u16) -> Self {
        Self {
            level0: true,
            duration0: high_ticks,
            level1: false,
            duration1: low_ticks,
        }
    }
}

/// Konfiguration des Sendekanals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Tick-Frequenz in Hz (10 MHz = 100 ns pro Tick)
    pub resolution_hz: u32,
    /// Symbole pro Speicherblock
    pub mem_block_symbols: u16,
    /// Tiefe der Sende-Queue
    pub trans_queue_depth: u8,
}

impl ChannelConfig {
    pub const DEFAULT: Self = Self {
        resolution_hz: 10_000_000,
        mem_block_symbols: 64,
        trans_queue_depth: 4,
    };
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Gesamte Konfiguration des LED-Treibers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedConfig {
    pub timing: BitTiming,
    pub order: ColorOrder,
    pub channel: ChannelConfig,
}

// ============================================================================
// WiFi: Zustände, Konfiguration, Events
// ============================================================================

/// Maximale SSID-Länge in Bytes
pub const MAX_SSID_LEN: usize = 32;

/// Maximale Passwort-Länge in Bytes
pub const MAX_PASSWORD_LEN: usize = 64;

/// Platzhalter für `get_ip_string()` solange keine Verbindung besteht
pub const NOT_CONNECTED: &str = "not connected";

pub type Ssid = String<MAX_SSID_LEN>;
pub type Password = String<MAX_PASSWORD_LEN>;

/// Zustand der WiFi-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Maximale Anzahl Versuche erreicht - bleibt bis zum nächsten `connect()`
    Failed,
    Disconnecting,
}

/// Authentifizierungsmodus des Access Points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuthMode {
    Open,
    #[default]
    Wpa2Personal,
    Wpa3Personal,
    Wpa2Wpa3Personal,
    Other,
}

/// Verbindungs-Konfiguration (SSID, Passwort, Retry-Verhalten)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub ssid: Ssid,
    pub password: Password,
    pub auth_mode: AuthMode,
    /// Anzahl Verbindungsabbrüche bis `Failed`
    ///
    /// Der Abbruch Nummer `max_retry` führt zu `Failed`, es werden also höchstens
    /// `max_retry - 1` erneute Verbindungsanfragen gestellt.
    pub max_retry: u8,
    /// Ab dieser Dauer wird ein laufender Verbindungsversuch als langsam gemeldet
    pub timeout_ms: u32,
    /// Feste Wartezeit vor jedem erneuten Versuch
    pub reconnect_delay_ms: u32,
}

impl ConnectionConfig {
    pub const DEFAULT_MAX_RETRY: u8 = 5;
    pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;
    pub const DEFAULT_RECONNECT_DELAY_MS: u32 = 1_000;

    /// Erstellt eine Konfiguration mit Default-Retry-Werten
    ///
    /// # Fehlerbehandlung
    /// `WifiError::InvalidArgument` wenn SSID oder Passwort leer sind
    /// oder nicht in die Puffer passen (32 bzw. 64 Bytes).
    pub fn new(ssid: &str, password: &str) -> Result<Self, WifiError> {
        if ssid.is_empty() || password.is_empty() {
            return Err(WifiError::InvalidArgument);
        }
        Ok(Self {
            ssid: String::try_from(ssid).map_err(|_| WifiError::InvalidArgument)?,
            password: String::try_from(password).map_err(|_| WifiError::InvalidArgument)?,
            ..Self::default()
        })
    }

    pub fn with_max_retry(mut self, max_retry: u8) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_reconnect_delay_ms(mut self, reconnect_delay_ms: u32) -> Self {
        self.reconnect_delay_ms = reconnect_delay_ms;
        self
    }

    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            auth_mode: AuthMode::default(),
            max_retry: Self::DEFAULT_MAX_RETRY,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            reconnect_delay_ms: Self::DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}

/// Station-Konfiguration, wie sie an den Netzwerk-Stack übergeben wird
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub ssid: Ssid,
    pub password: Password,
    pub auth_mode: AuthMode,
    pub pmf_capable: bool,
    pub pmf_required: bool,
}

/// Informationen über den verbundenen Access Point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointInfo {
    pub ssid: Ssid,
    /// Signalstärke in dBm
    pub rssi: i8,
    pub channel: u8,
    pub auth_mode: AuthMode,
}

/// Snapshot des Verbindungsstatus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiInfo {
    pub state: ConnectionState,
    pub ssid: Ssid,
    pub rssi: i8,
    pub auth_mode: AuthMode,
    pub channel: u8,
    pub ip_addr: Ipv4Addr,
}

impl WifiInfo {
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            ssid: String::new(),
            rssi: 0,
            auth_mode: AuthMode::Wpa2Personal,
            channel: 0,
            ip_addr: Ipv4Addr::UNSPECIFIED,
        }
    }

    /// Vergisst SSID, Link-Daten und IP-Adresse (Zustand bleibt)
    pub fn clear_link(&mut self) {
        self.ssid.clear();
        self.rssi = 0;
        self.channel = 0;
        self.ip_addr = Ipv4Addr::UNSPECIFIED;
    }
}

impl Default for WifiInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchrone Benachrichtigungen vom Netzwerk-Stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEvent {
    /// Station-Modus wurde gestartet
    StationStarted,
    /// Link zum Access Point steht (noch ohne IP)
    LinkUp,
    /// Link zum Access Point verloren
    LinkDown,
    /// DHCP hat eine Adresse vergeben
    AddressAssigned(Ipv4Addr),
}
