// WiFi Tasks - Connection Manager, Status-Worker und Netzwerk-Stack
use defmt::{error, info, warn};
use embassy_net::Runner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Duration, Instant, Timer, with_timeout};
use esp_core::status::EventFlags;
use esp_core::types::{ConnectionConfig, ConnectionState};
use esp_core::{ConnectionManager, WifiStatus};
use esp_radio::wifi::WifiDevice;

use crate::config::{
    WIFI_EVENT_TIMEOUT_MS, WIFI_MAX_RETRY, WIFI_PASSWORD, WIFI_RECONNECT_DELAY_MS, WIFI_SSID,
    WIFI_TIMEOUT_MS,
};
use crate::hal::EspWifiDriver;

/// Geteilter Status: geschrieben vom Connection-Task, gelesen von allen
pub type SharedWifiStatus = WifiStatus<CriticalSectionRawMutex>;

/// Wartezeit bevor ein fehlgeschlagenes `init()` wiederholt wird
const INIT_RETRY_DELAY_SECS: u64 = 5;

fn on_state_change(state: ConnectionState) {
    info!("WiFi: State -> {}", state);
}

fn on_ip_assigned(ip: &str) {
    info!("WiFi: Reachable at {}", ip);
}

/// Verbindungs-Konfiguration aus den Build-Zeit-Credentials
fn connection_config() -> ConnectionConfig {
    match ConnectionConfig::new(WIFI_SSID, WIFI_PASSWORD) {
        Ok(config) => config,
        Err(e) => {
            error!("WiFi: Invalid credentials in .env: {}", e);
            ConnectionConfig::default()
        }
    }
    .with_max_retry(WIFI_MAX_RETRY)
    .with_timeout_ms(WIFI_TIMEOUT_MS)
    .with_reconnect_delay_ms(WIFI_RECONNECT_DELAY_MS)
}

/// WiFi Connection Task
///
/// Besitzt den Connection Manager und ist sein Event-Kontext:
/// - Initialisiert den Stack und startet die Station
/// - Verbindet automatisch mit den konfigurierten Credentials
/// - Verarbeitet Link- und DHCP-Events (inkl. Retries)
#[embassy_executor::task]
pub async fn connection_task(driver: EspWifiDriver<'static>, status: &'static SharedWifiStatus) {
    info!("WiFi: Starting connection task");

    let mut manager = ConnectionManager::new(driver, Delay, status);
    manager.set_event_callback(&on_state_change);
    manager.set_ip_callback(&on_ip_assigned);

    if let Err(e) = manager.set_config(connection_config()) {
        error!("WiFi: Failed to apply configuration: {}", e);
    }

    while let Err(e) = manager.init().await {
        error!("WiFi: Init failed: {}, retrying", e);
        Timer::after(Duration::from_secs(INIT_RETRY_DELAY_SECS)).await;
    }

    loop {
        let event = manager.next_event().await;
        manager.handle_event(event).await;
    }
}

/// Status-Worker
///
/// Wartet auf Event-Bits (mit Timeout) und loggt Verbindungsereignisse.
/// Dauert ein Verbindungsversuch länger als `WIFI_TIMEOUT_MS`, wird einmal
/// gewarnt - abgebrochen wird nichts.
#[embassy_executor::task]
pub async fn status_task(status: &'static SharedWifiStatus) {
    let timeout = Duration::from_millis(WIFI_EVENT_TIMEOUT_MS);
    let slow_after = Duration::from_millis(u64::from(WIFI_TIMEOUT_MS));
    let mut connecting_since: Option<Instant> = None;
    let mut slow_reported = false;

    loop {
        match with_timeout(timeout, status.wait_flags()).await {
            Ok(bits) => {
                if bits.contains(EventFlags::CONNECTED) {
                    info!("WiFi: Associated with access point");
                }
                if bits.contains(EventFlags::GOT_IP) {
                    info!("WiFi: Connected, IP {}", status.ip_string().as_str());
                }
                if bits.contains(EventFlags::FAIL) {
                    error!("WiFi: Giving up, connection failed");
                }
            }
            Err(_) => {
                // Timeout: nur Zeitüberwachung
            }
        }

        if status.state() == ConnectionState::Connecting {
            let since = *connecting_since.get_or_insert_with(Instant::now);
            if !slow_reported && since.elapsed() > slow_after {
                warn!(
                    "WiFi: Connection attempt exceeds {} ms",
                    WIFI_TIMEOUT_MS
                );
                slow_reported = true;
            }
        } else {
            connecting_since = None;
            slow_reported = false;
        }
    }
}

/// Network Task
///
/// Überwacht den Netzwerk-Stack:
/// - Prozessiert Netzwerk-Pakete
/// - Managed TCP/IP Stack (inkl. DHCP)
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}
