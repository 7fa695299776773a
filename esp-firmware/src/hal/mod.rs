// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die esp-core Traits auf der echten Hardware:
// RMT für die WS2812B Datenleitung, esp-radio + embassy-net für WiFi.

pub mod rmt;
pub mod wifi_driver;

pub use rmt::{RmtPeripheral, RmtTxChannel};
pub use wifi_driver::EspWifiDriver;
