// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

use esp_core::BitTiming;
use esp_core::encoder::SYMBOLS_PER_PIXEL;
use esp_core::types::{ChannelConfig, ColorOrder, LedConfig};

// ============================================================================
// LED Konfiguration
// ============================================================================

/// GPIO-Pin für die WS2812B Datenleitung (onboard LED des ESP32-C6 DevKit)
pub const LED_GPIO_PIN: u8 = 8;

/// Anzahl der LEDs am Strang
pub const LED_COUNT: usize = 1;

/// Bit-Timing laut WS2812B Datenblatt (T0H/T0L/T1H/T1L in ns, Reset in µs)
pub const LED_TIMING: BitTiming = BitTiming::WS2812B;

/// Kanalreihenfolge auf der Datenleitung
pub const LED_COLOR_ORDER: ColorOrder = ColorOrder::Grb;

// ============================================================================
// RMT Konfiguration
// ============================================================================

/// RMT Quelltakt in MHz (APB)
pub const RMT_SOURCE_CLOCK_MHZ: u32 = 80;

/// Tick-Auflösung des Sendekanals: 10 MHz → 1 Tick = 100 ns
pub const RMT_RESOLUTION_HZ: u32 = 10_000_000;

/// Symbolspeicher pro Kanal
pub const RMT_MEM_BLOCK_SYMBOLS: u16 = 64;

/// Maximale Anzahl wartender Transfers
pub const RMT_TRANS_QUEUE_DEPTH: u8 = 4;

/// Puls-Puffer: 24 Symbole pro LED + End-Marker
pub const RMT_BUFFER_LEN: usize = LED_COUNT * SYMBOLS_PER_PIXEL + 1;

/// Komplette Treiber-Konfiguration
pub const LED_CONFIG: LedConfig = LedConfig {
    timing: LED_TIMING,
    order: LED_COLOR_ORDER,
    channel: ChannelConfig {
        resolution_hz: RMT_RESOLUTION_HZ,
        mem_block_symbols: RMT_MEM_BLOCK_SYMBOLS,
        trans_queue_depth: RMT_TRANS_QUEUE_DEPTH,
    },
};

// ============================================================================
// Demo-Muster (Zeiten in Millisekunden)
// ============================================================================

/// Wartezeit nach dem Boot bevor das Demo startet
pub const DEMO_STARTUP_DELAY_MS: u64 = 1_000;

/// Pause zwischen zwei Abschnitten
pub const DEMO_SECTION_PAUSE_MS: u64 = 1_000;

pub const DEMO_BASIC_COLOR_MS: u64 = 1_000;
pub const DEMO_RAINBOW_STEP_MS: u64 = 50;
pub const DEMO_FADE_STEP_MS: u64 = 20;
pub const DEMO_BLINK_MS: u64 = 200;
pub const DEMO_BLINK_COUNT: usize = 10;
pub const DEMO_ACCENT_COLOR_MS: u64 = 500;
pub const DEMO_BREATH_STEP_MS: u64 = 30;
pub const DEMO_BREATH_LEVEL_STEP: u8 = 5;
pub const DEMO_BREATH_CYCLES: usize = 3;

/// Pause am Ende jedes Durchlaufs
pub const DEMO_CYCLE_PAUSE_MS: u64 = 5_000;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Verbindungsabbrüche bis zum Zustand `Failed`
pub const WIFI_MAX_RETRY: u8 = 5;

/// Ab dieser Dauer wird ein Verbindungsversuch als langsam gemeldet
pub const WIFI_TIMEOUT_MS: u32 = 10_000;

/// Feste Wartezeit vor jedem erneuten Versuch
pub const WIFI_RECONNECT_DELAY_MS: u32 = 1_000;

/// Timeout des Status-Workers beim Warten auf Event-Bits
pub const WIFI_EVENT_TIMEOUT_MS: u64 = 1_000;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

/// Intervall für das Heap-Log im Main-Loop
pub const HEAP_REPORT_INTERVAL_SECS: u64 = 10;
