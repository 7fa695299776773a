//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies:
//! - WS2812B Bit-Encoder und Treiber über dem `PulsePeripheral`-Trait
//! - WiFi Connection Manager über dem `WifiDriver`-Trait
//! - Geteilter Status (`WifiStatus`) und Demo-Farbverläufe
//!
//! Mit dem Feature `defmt` wird über `defmt` geloggt, sonst gar nicht.

#![no_std]

#[macro_use]
mod fmt;

pub mod encoder;
pub mod logic;
pub mod status;
pub mod traits;
pub mod types;
pub mod wifi;
pub mod ws2812;

// Re-exports für einfachen Zugriff
pub use encoder::{BitEncoder, SYMBOLS_PER_PIXEL};
pub use status::{EventFlags, WifiStatus};
pub use traits::{DriverError, LedError, PulseChannel, PulsePeripheral, WifiDriver, WifiError};
pub use types::{
    AccessPointInfo, BitTiming, ChannelConfig, ColorOrder, ConnectionConfig, ConnectionState,
    LedConfig, NetEvent, PulseSymbol, StationConfig, WifiInfo,
};
pub use wifi::ConnectionManager;
pub use ws2812::Ws2812Driver;
