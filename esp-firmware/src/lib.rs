// Library-Root: Hardware-Anbindung und Tasks
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

use esp_core::Ws2812Driver;
use esp_hal::Blocking;
use esp_hal::delay::Delay;
use esp_hal::gpio::AnyPin;
use esp_hal::rmt::ChannelCreator;

use crate::config::LED_COUNT;
use crate::hal::RmtPeripheral;

// ============================================================================
// Type-Aliase für die konkrete Hardware
// ============================================================================
//
// Embassy Tasks dürfen nicht generisch sein, daher werden die Treiber hier
// auf die Board-Typen festgelegt.

/// RMT Kanal 0 auf einem beliebigen GPIO
pub type LedPeripheral = RmtPeripheral<'static, ChannelCreator<'static, Blocking, 0>, AnyPin<'static>>;

/// WS2812B Treiber für den Strang an `LED_GPIO_PIN`
pub type LedDriver = Ws2812Driver<LedPeripheral, Delay, LED_COUNT>;
