// WiFi Stack-Adapter
//
// Implementiert den esp-core Trait `WifiDriver` auf esp-radio
// (WifiController) und embassy-net (DHCP-Status des Stacks).

use core::fmt::Debug;

use defmt::{Debug2Format, debug, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use esp_core::traits::{DriverError, WifiDriver};
use esp_core::types::{AccessPointInfo, AuthMode, NetEvent, Ssid, StationConfig};
use esp_radio::wifi::{AuthMethod, ClientConfig, ModeConfig, ScanConfig, WifiController, WifiEvent};
use heapless::Deque;

/// Puffer für Events, die gemeinsam gemeldet wurden
const PENDING_EVENTS: usize = 4;

/// esp-radio + embassy-net als `WifiDriver`
pub struct EspWifiDriver<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
    pending: Deque<NetEvent, PENDING_EVENTS>,
    ssid: Ssid,
    address_reported: bool,
    initialized: bool,
}

impl<'d> EspWifiDriver<'d> {
    pub fn new(controller: WifiController<'d>, stack: Stack<'d>) -> Self {
        Self {
            controller,
            stack,
            pending: Deque::new(),
            ssid: Ssid::new(),
            address_reported: false,
            initialized: false,
        }
    }

    fn push_event(&mut self, event: NetEvent) {
        if self.pending.push_back(event).is_err() {
            warn!("WiFi: Event queue full, event dropped");
        }
    }
}

fn rejected<E: Debug>(context: &str, err: E) -> DriverError {
    warn!("WiFi: {} failed: {}", context, Debug2Format(&err));
    DriverError::Rejected
}

fn auth_method(mode: AuthMode) -> AuthMethod {
    match mode {
        AuthMode::Open => AuthMethod::None,
        AuthMode::Wpa2Personal => AuthMethod::Wpa2Personal,
        AuthMode::Wpa3Personal => AuthMethod::Wpa3Personal,
        AuthMode::Wpa2Wpa3Personal => AuthMethod::Wpa2Wpa3Personal,
        AuthMode::Other => AuthMethod::Wpa2Personal,
    }
}

fn auth_mode(method: Option<AuthMethod>) -> AuthMode {
    match method {
        Some(AuthMethod::None) => AuthMode::Open,
        Some(AuthMethod::Wpa2Personal) => AuthMode::Wpa2Personal,
        Some(AuthMethod::Wpa3Personal) => AuthMode::Wpa3Personal,
        Some(AuthMethod::Wpa2Wpa3Personal) => AuthMode::Wpa2Wpa3Personal,
        _ => AuthMode::Other,
    }
}

impl WifiDriver for EspWifiDriver<'_> {
    async fn init(&mut self) -> Result<(), DriverError> {
        // Radio und Interfaces werden in main() angelegt
        self.pending.clear();
        self.address_reported = false;
        self.initialized = true;
        Ok(())
    }

    async fn deinit(&mut self) -> Result<(), DriverError> {
        if matches!(self.controller.is_started(), Ok(true)) {
            self.controller
                .stop_async()
                .await
                .map_err(|e| rejected("Stop", e))?;
        }
        self.pending.clear();
        self.initialized = false;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DriverError> {
        if !self.initialized {
            return Err(DriverError::NotStarted);
        }
        self.controller
            .start_async()
            .await
            .map_err(|e| rejected("Start", e))?;
        self.push_event(NetEvent::StationStarted);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), DriverError> {
        self.controller
            .stop_async()
            .await
            .map_err(|e| rejected("Stop", e))
    }

    fn set_station_config(&mut self, config: &StationConfig) -> Result<(), DriverError> {
        if config.pmf_required {
            warn!("WiFi: PMF required is not supported, using PMF capable");
        }

        let client_config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(config.ssid.as_str().into())
                .with_password(config.password.as_str().into())
                .with_auth_method(auth_method(config.auth_mode)),
        );

        self.controller
            .set_config(&client_config)
            .map_err(|e| rejected("Set configuration", e))?;
        self.ssid = config.ssid.clone();
        Ok(())
    }

    fn connect(&mut self) -> Result<(), DriverError> {
        if !matches!(self.controller.is_started(), Ok(true)) {
            return Err(DriverError::NotStarted);
        }
        self.controller.connect().map_err(|e| rejected("Connect", e))
    }

    fn disconnect(&mut self) -> Result<(), DriverError> {
        self.controller
            .disconnect()
            .map_err(|e| rejected("Disconnect", e))
    }

    async fn access_point_info(&mut self) -> Option<AccessPointInfo> {
        let access_points = match self
            .controller
            .scan_with_config_async(ScanConfig::default())
            .await
        {
            Ok(access_points) => access_points,
            Err(e) => {
                warn!("WiFi: Scan failed: {}", Debug2Format(&e));
                return None;
            }
        };

        debug!("WiFi: Found {} access points", access_points.len());
        access_points
            .iter()
            .filter(|ap| ap.ssid.as_str() == self.ssid.as_str())
            .max_by_key(|ap| ap.signal_strength)
            .map(|ap| AccessPointInfo {
                ssid: self.ssid.clone(),
                rssi: ap.signal_strength,
                channel: ap.channel,
                auth_mode: auth_mode(ap.auth_method),
            })
    }

    async fn next_event(&mut self) -> NetEvent {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }

            let stack = self.stack;
            let address_reported = self.address_reported;
            let address_change = async move {
                if address_reported {
                    stack.wait_config_down().await;
                    None
                } else {
                    stack.wait_config_up().await;
                    stack.config_v4().map(|config| config.address.address())
                }
            };
            let link_change = self
                .controller
                .wait_for_events(WifiEvent::StaConnected | WifiEvent::StaDisconnected, false);

            match select(link_change, address_change).await {
                Either::First(events) => {
                    if events.contains(WifiEvent::StaConnected) {
                        self.push_event(NetEvent::LinkUp);
                    }
                    if events.contains(WifiEvent::StaDisconnected) {
                        self.push_event(NetEvent::LinkDown);
                    }
                }
                Either::Second(Some(address)) => {
                    info!("WiFi: DHCP lease acquired");
                    self.address_reported = true;
                    self.push_event(NetEvent::AddressAssigned(address));
                }
                Either::Second(None) => {
                    debug!("WiFi: DHCP lease lost");
                    self.address_reported = false;
                }
            }
        }
    }
}
