//! WiFi Connection Manager
//!
//! Zustandsautomat für genau eine Station-Verbindung:
//!
//! ```text
//! Disconnected ──connect()/StationStarted──▶ Connecting ──AddressAssigned──▶ Connected
//!                                              │   ▲                           │
//!                                    LinkDown  │   └────── LinkDown (Retry) ───┘
//!                              (Budget leer)   ▼
//!                                            Failed ──connect()──▶ Connecting
//!
//! Connecting/Connected ──disconnect()──▶ Disconnecting ──LinkDown──▶ Disconnected
//! ```
//!
//! Events kommen asynchron vom Netzwerk-Stack (`WifiDriver::next_event`).
//! Der Task, der `next_event()` + `handle_event()` aufruft, ist der
//! Event-Kontext: Zustandsänderungen und Callbacks passieren nur dort.

use core::net::Ipv4Addr;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;
use crate::status::{EventFlags, IpString, WifiStatus, format_ip};
use crate::traits::{DriverError, WifiDriver, WifiError};
use crate::types::{ConnectionConfig, ConnectionState, NetEvent, Ssid, StationConfig, WifiInfo};

/// Wartezeit nach einem Disconnect bevor neu verbunden wird
pub const DISCONNECT_SETTLE_MS: u32 = 100;

/// Callback bei jedem Zustandswechsel
pub type EventCallback<'a> = &'a dyn Fn(ConnectionState);

/// Callback bei jeder IP-Vergabe (Dotted-Quad)
pub type IpCallback<'a> = &'a dyn Fn(&str);

/// WiFi Connection Manager
///
/// # Trait-basierte Abstraktion
/// - `W: WifiDriver` - esp-radio/embassy-net im Production-Code, Mock in Tests
/// - `D: DelayNs` - async Delay für Settle-Zeiten
/// - `M: RawMutex` - Mutex des geteilten Status
pub struct ConnectionManager<'a, W: WifiDriver, D: DelayNs, M: RawMutex> {
    driver: W,
    delay: D,
    status: &'a WifiStatus<M>,
    config: ConnectionConfig,
    retry_count: u8,
    initialized: bool,
    event_callback: Option<EventCallback<'a>>,
    ip_callback: Option<IpCallback<'a>>,
}

impl<'a, W: WifiDriver, D: DelayNs, M: RawMutex> ConnectionManager<'a, W, D, M> {
    pub fn new(driver: W, delay: D, status: &'a WifiStatus<M>) -> Self {
        Self {
            driver,
            delay,
            status,
            config: ConnectionConfig::default(),
            retry_count: 0,
            initialized: false,
            event_callback: None,
            ip_callback: None,
        }
    }

    // ========================================================================
    // Lebenszyklus
    // ========================================================================

    /// Initialisiert den Stack und startet den Station-Modus
    ///
    /// Ist bereits eine SSID konfiguriert, wird sie vor dem Start gesetzt;
    /// das folgende `StationStarted`-Event verbindet dann automatisch.
    ///
    /// # Fehlerbehandlung
    /// `WifiError::NoMemory` wenn der Stack keine Ressourcen bekommt.
    pub async fn init(&mut self) -> Result<(), WifiError> {
        if self.initialized {
            warn!("WiFi: Manager already initialized");
            return Ok(());
        }

        info!("WiFi: Initializing manager");
        self.driver
            .init()
            .await
            .inspect_err(|e| error!("WiFi: Stack init failed: {}", e))?;

        self.status.reset();
        self.retry_count = 0;

        if let Err(e) = self.start_station().await {
            error!("WiFi: Failed to start station: {}", e);
            let _ = self.driver.deinit().await;
            return Err(e.into());
        }

        self.initialized = true;
        info!("WiFi: Manager initialized");
        Ok(())
    }

    /// Stoppt die Station und gibt alle Ressourcen frei
    pub async fn deinit(&mut self) -> Result<(), WifiError> {
        if !self.initialized {
            return Ok(());
        }

        info!("WiFi: Deinitializing manager");
        if let Err(e) = self.driver.stop().await {
            warn!("WiFi: Failed to stop station: {}", e);
        }
        self.driver.deinit().await?;

        self.status.reset();
        self.retry_count = 0;
        self.initialized = false;
        info!("WiFi: Manager deinitialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ========================================================================
    // Verbindung
    // ========================================================================

    /// Verbindet mit einem Access Point
    ///
    /// Läuft bereits ein Versuch oder besteht eine Verbindung, wird zuerst
    /// getrennt und kurz gewartet.
    ///
    /// # Fehlerbehandlung
    /// - `WifiError::InvalidState` vor `init()`
    /// - `WifiError::InvalidArgument` bei leerer oder zu langer SSID/Passwort
    /// - `WifiError::Stack` wenn der Stack die Anfrage ablehnt; die gespeicherte
    ///   Konfiguration bleibt dann unverändert, eine zuvor getrennte Verbindung
    ///   endet in `Disconnected`
    pub async fn connect(&mut self, ssid: &str, password: &str) -> Result<(), WifiError> {
        if !self.initialized {
            error!("WiFi: Manager not initialized");
            return Err(WifiError::InvalidState);
        }

        let credentials = ConnectionConfig::new(ssid, password).inspect_err(|_| {
            error!("WiFi: SSID or password empty or too long");
        })?;

        let link_active = matches!(
            self.status.state(),
            ConnectionState::Connecting | ConnectionState::Connected
        );
        if link_active {
            info!("WiFi: Connection in progress, disconnecting first");
            if let Err(e) = self.driver.disconnect() {
                warn!("WiFi: Disconnect failed: {}", e);
            }
            self.delay.delay_ms(DISCONNECT_SETTLE_MS).await;
            self.status.update(WifiInfo::clear_link);
        }

        info!("WiFi: Connecting to '{}'", ssid);

        // gespeicherte Konfiguration erst nach angenommener Anfrage ersetzen
        let mut next = self.config.clone();
        next.ssid = credentials.ssid;
        next.password = credentials.password;

        if let Err(e) = self.request_connect(&next) {
            error!("WiFi: Connect request failed: {}", e);
            if link_active {
                self.set_state(ConnectionState::Disconnected);
            }
            return Err(e.into());
        }

        self.config = next;
        self.retry_count = 0;
        self.set_state(ConnectionState::Connecting);
        Ok(())
    }

    /// Verbindet mit den gespeicherten Zugangsdaten
    pub async fn connect_default(&mut self) -> Result<(), WifiError> {
        let ssid = self.config.ssid.clone();
        let password = self.config.password.clone();
        self.connect(&ssid, &password).await
    }

    /// Trennt die Verbindung (abgeschlossen durch das folgende `LinkDown`)
    ///
    /// Lehnt der Stack ab, bleibt der Zustand unverändert.
    pub fn disconnect(&mut self) -> Result<(), WifiError> {
        if !self.initialized {
            error!("WiFi: Manager not initialized");
            return Err(WifiError::InvalidState);
        }

        let state = self.status.state();
        if !matches!(
            state,
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            debug!("WiFi: Nothing to disconnect in state {}", state);
            return Ok(());
        }

        info!("WiFi: Disconnecting");
        self.driver
            .disconnect()
            .inspect_err(|e| error!("WiFi: Disconnect request failed: {}", e))?;
        self.set_state(ConnectionState::Disconnecting);
        Ok(())
    }

    /// Neuer Verbindungsversuch mit der aktuellen Konfiguration
    ///
    /// Setzt den Retry-Zähler zurück, auch aus `Failed` heraus.
    pub fn reconnect(&mut self) -> Result<(), WifiError> {
        if !self.initialized {
            error!("WiFi: Manager not initialized");
            return Err(WifiError::InvalidState);
        }
        if self.config.ssid.is_empty() {
            error!("WiFi: No SSID configured");
            return Err(WifiError::InvalidState);
        }

        info!("WiFi: Reconnecting");
        self.retry_count = 0;
        self.driver.connect()?;
        self.set_state(ConnectionState::Connecting);
        Ok(())
    }

    // ========================================================================
    // Konfiguration
    // ========================================================================

    /// Ersetzt die Konfiguration (nicht während eines laufenden Versuchs)
    pub fn set_config(&mut self, config: ConnectionConfig) -> Result<(), WifiError> {
        if matches!(
            self.status.state(),
            ConnectionState::Connecting | ConnectionState::Disconnecting
        ) {
            error!("WiFi: Config is locked while a connection attempt runs");
            return Err(WifiError::InvalidState);
        }

        info!(
            "WiFi: Config updated: SSID={}, max_retry={}, timeout={}ms",
            config.ssid.as_str(),
            config.max_retry,
            config.timeout_ms
        );
        self.config = config;
        Ok(())
    }

    pub fn get_config(&self) -> &ConnectionConfig {
        &self.config
    }

    // ========================================================================
    // Status (Snapshot-Leser)
    // ========================================================================

    pub fn get_info(&self) -> WifiInfo {
        self.status.snapshot()
    }

    pub fn get_state(&self) -> ConnectionState {
        self.status.state()
    }

    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    pub fn get_ip_string(&self) -> IpString {
        self.status.ip_string()
    }

    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    // ========================================================================
    // Beobachter
    // ========================================================================

    /// Registriert den Zustands-Callback (ersetzt einen vorherigen)
    pub fn set_event_callback(&mut self, callback: EventCallback<'a>) {
        self.event_callback = Some(callback);
    }

    /// Registriert den IP-Callback (ersetzt einen vorherigen)
    pub fn set_ip_callback(&mut self, callback: IpCallback<'a>) {
        self.ip_callback = Some(callback);
    }

    // ========================================================================
    // Event-Verarbeitung
    // ========================================================================

    /// Wartet auf das nächste Event des Netzwerk-Stacks
    pub async fn next_event(&mut self) -> NetEvent {
        self.driver.next_event().await
    }

    /// Verarbeitet ein Event (nur aus dem Event-Kontext aufrufen)
    pub async fn handle_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::StationStarted => self.on_station_started(),
            NetEvent::LinkUp => self.on_link_up().await,
            NetEvent::LinkDown => self.on_link_down().await,
            NetEvent::AddressAssigned(addr) => self.on_address_assigned(addr),
        }
    }

    fn on_station_started(&mut self) {
        info!("WiFi: Station mode started");

        if self.status.state() != ConnectionState::Disconnected {
            return;
        }
        if self.config.ssid.is_empty() {
            info!("WiFi: No SSID configured, waiting for connect()");
            return;
        }

        if let Err(e) = self.driver.connect() {
            error!("WiFi: Connect request failed: {}", e);
            return;
        }
        self.retry_count = 0;
        self.set_state(ConnectionState::Connecting);
    }

    async fn on_link_up(&mut self) {
        info!("WiFi: Link established");
        self.status.set_flags(EventFlags::CONNECTED);

        match self.driver.access_point_info().await {
            Some(ap) => {
                info!(
                    "WiFi: AP '{}', RSSI {} dBm, channel {}",
                    ap.ssid.as_str(),
                    ap.rssi,
                    ap.channel
                );
                self.status.update(|info| {
                    info.ssid = ap.ssid;
                    info.rssi = ap.rssi;
                    info.channel = ap.channel;
                    info.auth_mode = ap.auth_mode;
                });
            }
            None => {
                let ssid: Ssid = self.config.ssid.clone();
                self.status.update(|info| info.ssid = ssid);
            }
        }
    }

    async fn on_link_down(&mut self) {
        let state = self.status.state();
        match state {
            ConnectionState::Disconnecting => {
                info!("WiFi: Disconnected");
                self.status.update(WifiInfo::clear_link);
                self.set_state(ConnectionState::Disconnected);
            }
            ConnectionState::Connecting | ConnectionState::Connected => {
                info!("WiFi: Link lost");
                self.status.update(WifiInfo::clear_link);

                // feste Wartezeit, kein exponentielles Backoff
                self.delay.delay_ms(self.config.reconnect_delay_ms).await;

                // Zustand kann sich während des Wartens nicht ändern: nur dieser
                // Kontext schreibt ihn.
                self.retry_count = self.retry_count.saturating_add(1);
                if self.retry_count >= self.config.max_retry {
                    error!(
                        "WiFi: Connection failed after {} attempts",
                        self.retry_count
                    );
                    self.status.set_flags(EventFlags::FAIL);
                    self.set_state(ConnectionState::Failed);
                    return;
                }

                info!(
                    "WiFi: Retrying connection... ({}/{})",
                    self.retry_count,
                    self.config.max_retry
                );
                if let Err(e) = self.driver.connect() {
                    error!("WiFi: Reconnect request failed: {}", e);
                }
                self.set_state(ConnectionState::Connecting);
            }
            ConnectionState::Disconnected | ConnectionState::Failed => {
                debug!("WiFi: Link down ignored in state {}", state);
            }
        }
    }

    fn on_address_assigned(&mut self, addr: Ipv4Addr) {
        let state = self.status.state();
        if !matches!(
            state,
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            warn!("WiFi: Address assigned in state {}, ignored", state);
            return;
        }

        let ip = format_ip(addr);
        info!("WiFi: Got IP address: {}", ip.as_str());

        self.retry_count = 0;
        self.status.update(|info| info.ip_addr = addr);
        self.status.set_flags(EventFlags::GOT_IP);

        if state != ConnectionState::Connected {
            self.set_state(ConnectionState::Connected);
        }
        if let Some(callback) = self.ip_callback {
            callback(ip.as_str());
        }
    }

    // ========================================================================
    // Hilfsfunktionen
    // ========================================================================

    fn set_state(&mut self, state: ConnectionState) {
        self.status.update(|info| info.state = state);
        if let Some(callback) = self.event_callback {
            callback(state);
        }
    }

    /// Setzt die gespeicherte Station-Konfiguration (falls vorhanden) und startet
    async fn start_station(&mut self) -> Result<(), DriverError> {
        if !self.config.ssid.is_empty() {
            let station = station_config(&self.config);
            self.driver.set_station_config(&station)?;
        }
        self.driver.start().await
    }

    fn request_connect(&mut self, config: &ConnectionConfig) -> Result<(), DriverError> {
        self.driver.set_station_config(&station_config(config))?;
        self.status.clear_flags(EventFlags::ALL);
        self.driver.connect()
    }
}

fn station_config(config: &ConnectionConfig) -> StationConfig {
    StationConfig {
        ssid: config.ssid.clone(),
        password: config.password.clone(),
        auth_mode: config.auth_mode,
        pmf_capable: true,
        pmf_required: false,
    }
}
