// RMT Puls-Peripheral für die WS2812B Datenleitung
//
// Implementiert die esp-core Traits `PulsePeripheral` und `PulseChannel`
// auf einem esp-hal RMT Sendekanal (Blocking).

use defmt::{debug, error, warn};
use esp_core::traits::{LedError, PulseChannel, PulsePeripheral};
use esp_core::types::{ChannelConfig, PulseSymbol};
use esp_hal::Blocking;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::gpio::{Level, Pin};
use esp_hal::rmt::{Channel, PulseCode, Tx, TxChannelConfig, TxChannelCreator};

/// Symbole pro RMT-Speicherblock (ESP32-C6)
const RMT_BLOCK_SYMBOLS: u16 = 48;

/// Zustand des einzigen Sendekanals
enum Slot<'d, C, O> {
    /// Noch nie beansprucht: Kanal-Creator und Pin liegen bereit
    Unconfigured { creator: C, pin: O },
    /// Konfigurierter Kanal nach `release()`
    Parked {
        channel: Channel<'d, Blocking, Tx>,
        config: ChannelConfig,
    },
    /// An einen `RmtTxChannel` ausgegeben
    Claimed,
    /// Konfiguration oder Transfer hat den Kanal verbraucht
    Lost,
}

/// RMT Peripheral mit genau einem Sendekanal auf einem festen Pin
///
/// # Parameter
/// - `source_clock_hz`: RMT Quelltakt (aus `Rmt::new`), für den Clock-Divider
pub struct RmtPeripheral<'d, C, O>
where
    C: TxChannelCreator<'d, Blocking>,
    O: PeripheralOutput<'d>,
{
    slot: Slot<'d, C, O>,
    pin_number: u8,
    source_clock_hz: u32,
}

impl<'d, C, O> RmtPeripheral<'d, C, O>
where
    C: TxChannelCreator<'d, Blocking>,
    O: PeripheralOutput<'d> + Pin,
{
    pub fn new(creator: C, pin: O, source_clock_hz: u32) -> Self {
        let pin_number = pin.number();
        Self {
            slot: Slot::Unconfigured { creator, pin },
            pin_number,
            source_clock_hz,
        }
    }
}

impl<'d, C, O> RmtPeripheral<'d, C, O>
where
    C: TxChannelCreator<'d, Blocking>,
    O: PeripheralOutput<'d>,
{
    /// Übersetzt die Kanal-Konfiguration in eine esp-hal `TxChannelConfig`
    ///
    /// # Fehlerbehandlung
    /// `LedError::ResourceUnavailable` wenn sich die Auflösung nicht mit
    /// einem ganzzahligen 8-Bit-Divider aus dem Quelltakt erzeugen lässt.
    fn tx_config(&self, config: &ChannelConfig) -> Result<TxChannelConfig, LedError> {
        if config.resolution_hz == 0 || self.source_clock_hz % config.resolution_hz != 0 {
            error!(
                "RMT: {} Hz not reachable from {} Hz source clock",
                config.resolution_hz, self.source_clock_hz
            );
            return Err(LedError::ResourceUnavailable);
        }
        let divider = u8::try_from(self.source_clock_hz / config.resolution_hz)
            .map_err(|_| LedError::ResourceUnavailable)?;

        let blocks = config.mem_block_symbols.div_ceil(RMT_BLOCK_SYMBOLS).max(1);
        let memsize = u8::try_from(blocks).map_err(|_| LedError::ResourceUnavailable)?;

        debug!(
            "RMT: divider {}, {} memory block(s), queue depth {}",
            divider, memsize, config.trans_queue_depth
        );

        Ok(TxChannelConfig::default()
            .with_clk_divider(divider)
            .with_idle_output(true)
            .with_idle_output_level(Level::Low)
            .with_carrier_modulation(false)
            .with_memsize(memsize))
    }
}

impl<'d, C, O> PulsePeripheral for RmtPeripheral<'d, C, O>
where
    C: TxChannelCreator<'d, Blocking>,
    O: PeripheralOutput<'d>,
{
    type Channel = RmtTxChannel<'d>;

    fn claim(&mut self, pin: u8, config: &ChannelConfig) -> Result<Self::Channel, LedError> {
        if pin != self.pin_number {
            error!("RMT: GPIO{} is not wired to the RMT channel", pin);
            return Err(LedError::ResourceUnavailable);
        }

        match core::mem::replace(&mut self.slot, Slot::Claimed) {
            Slot::Unconfigured { creator, pin } => {
                let tx_config = match self.tx_config(config) {
                    Ok(tx_config) => tx_config,
                    Err(e) => {
                        self.slot = Slot::Unconfigured { creator, pin };
                        return Err(e);
                    }
                };
                match creator.configure_tx(pin, tx_config) {
                    Ok(channel) => Ok(RmtTxChannel::new(channel, *config)),
                    Err(e) => {
                        error!("RMT: Failed to configure TX channel: {}", e);
                        self.slot = Slot::Lost;
                        Err(LedError::ResourceUnavailable)
                    }
                }
            }
            Slot::Parked {
                channel,
                config: parked,
            } => {
                if parked != *config {
                    warn!("RMT: Channel already configured, new channel config ignored");
                }
                Ok(RmtTxChannel::new(channel, parked))
            }
            Slot::Claimed => {
                error!("RMT: Channel already claimed");
                Err(LedError::ResourceUnavailable)
            }
            Slot::Lost => {
                self.slot = Slot::Lost;
                error!("RMT: Channel unavailable");
                Err(LedError::ResourceUnavailable)
            }
        }
    }

    fn release(&mut self, channel: Self::Channel) {
        self.slot = match channel.channel {
            Some(handle) => Slot::Parked {
                channel: handle,
                config: channel.config,
            },
            None => Slot::Lost,
        };
    }
}

/// Beanspruchter RMT Sendekanal
///
/// Der Puls-Puffer reicht für `RMT_BUFFER_LEN - 1` Symbole plus End-Marker.
pub struct RmtTxChannel<'d> {
    channel: Option<Channel<'d, Blocking, Tx>>,
    config: ChannelConfig,
    buffer: [PulseCode; crate::config::RMT_BUFFER_LEN],
    enabled: bool,
}

impl<'d> RmtTxChannel<'d> {
    fn new(channel: Channel<'d, Blocking, Tx>, config: ChannelConfig) -> Self {
        Self {
            channel: Some(channel),
            config,
            buffer: [PulseCode::end_marker(); crate::config::RMT_BUFFER_LEN],
            enabled: false,
        }
    }
}

fn pulse_code(symbol: PulseSymbol) -> PulseCode {
    PulseCode::new(
        Level::from(symbol.level0),
        symbol.duration0,
        Level::from(symbol.level1),
        symbol.duration1,
    )
}

impl PulseChannel for RmtTxChannel<'_> {
    fn enable(&mut self) -> Result<(), LedError> {
        if self.channel.is_none() {
            return Err(LedError::ResourceUnavailable);
        }
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn transmit<I>(&mut self, symbols: I) -> Result<(), LedError>
    where
        I: IntoIterator<Item = PulseSymbol>,
    {
        if !self.enabled {
            error!("RMT: Transmit on disabled channel");
            return Err(LedError::TransmitFailed);
        }

        // letzter Slot bleibt für den End-Marker
        let capacity = self.buffer.len() - 1;
        let mut len = 0;
        for symbol in symbols {
            if len == capacity {
                error!("RMT: Pulse buffer too small ({} symbols)", capacity);
                return Err(LedError::TransmitFailed);
            }
            self.buffer[len] = pulse_code(symbol);
            len += 1;
        }
        self.buffer[len] = PulseCode::end_marker();

        let Some(channel) = self.channel.take() else {
            error!("RMT: Channel lost during previous transmission");
            return Err(LedError::TransmitFailed);
        };

        let transaction = match channel.transmit(&self.buffer[..=len]) {
            Ok(transaction) => transaction,
            Err(e) => {
                error!("RMT: Transmit failed: {}", e);
                return Err(LedError::TransmitFailed);
            }
        };

        match transaction.wait() {
            Ok(channel) => {
                self.channel = Some(channel);
                Ok(())
            }
            Err((e, channel)) => {
                error!("RMT: Transaction failed: {}", e);
                self.channel = Some(channel);
                Err(LedError::TransmitFailed)
            }
        }
    }
}
