// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::AnyPin;
use esp_hal::rmt::Rmt;
use esp_hal::rng::Rng;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use esp_core::{WifiStatus, Ws2812Driver};
use esp_ws2812_wifi::LedDriver;
use esp_ws2812_wifi::config::{
    EXTRA_HEAP_SIZE, HEAP_REPORT_INTERVAL_SECS, LED_CONFIG, LED_GPIO_PIN, RMT_SOURCE_CLOCK_MHZ,
    WIFI_HEAP_SIZE,
};
use esp_ws2812_wifi::hal::{EspWifiDriver, RmtPeripheral};
use esp_ws2812_wifi::tasks::{
    SharedWifiStatus, connection_task, led_demo_task, net_task, status_task,
};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// WiFi-Status, geteilt zwischen Connection-Task und Status-Worker
static WIFI_STATUS: SharedWifiStatus = WifiStatus::new();

/// Main Entry Point
///
/// Initialisiert Hardware, LED-Treiber und WiFi, spawnt die Tasks und
/// meldet danach periodisch den freien Heap.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    // Zwei Bereiche: reclaimed RAM (64 KB) + extra (36 KB) = 100 KB total
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    info!("Main: WS2812B + WiFi firmware starting");

    // WS2812B Treiber auf RMT Kanal 0
    let led = match Rmt::new(peripherals.RMT, Rate::from_mhz(RMT_SOURCE_CLOCK_MHZ)) {
        Ok(rmt) => {
            let led_pin: AnyPin<'static> = peripherals.GPIO8.into();
            let peripheral =
                RmtPeripheral::new(rmt.channel0, led_pin, RMT_SOURCE_CLOCK_MHZ * 1_000_000);
            let mut led: LedDriver = Ws2812Driver::new(peripheral, Delay::new(), LED_CONFIG);
            match led.init(LED_GPIO_PIN) {
                Ok(()) => Some(led),
                Err(e) => {
                    error!("Main: WS2812B init failed: {}", e);
                    None
                }
            }
        }
        Err(e) => {
            error!("Main: RMT init failed: {}", e);
            None
        }
    };

    // Ohne LED-Treiber läuft nichts weiter (wie ein fehlgeschlagener Boot)
    let Some(led) = led else {
        loop {
            Timer::after(Duration::from_secs(HEAP_REPORT_INTERVAL_SECS)).await;
        }
    };
    info!("Main: WS2812B driver ready on GPIO{}", LED_GPIO_PIN);

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Netzwerk-Stack erstellen
    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Static resources für embassy-net (nur DHCP-Socket)
    static RESOURCES: static_cell::StaticCell<StackResources<3>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    // embassy-net erstellt Stack + Runner (nutzt STA interface für Client-Modus)
    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    let wifi_driver = EspWifiDriver::new(wifi_controller, stack);

    // Spawn Tasks
    spawner.spawn(led_demo_task(led)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner
        .spawn(connection_task(wifi_driver, &WIFI_STATUS))
        .unwrap();
    spawner.spawn(status_task(&WIFI_STATUS)).unwrap();

    info!("Main: All tasks started");

    // Main-Loop: meldet periodisch den freien Heap
    loop {
        Timer::after(Duration::from_secs(HEAP_REPORT_INTERVAL_SECS)).await;
        info!(
            "Main: Running, free heap: {} bytes, WiFi: {}",
            esp_alloc::HEAP.free(),
            WIFI_STATUS.ip_string().as_str()
        );
    }
}
