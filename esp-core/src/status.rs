//! Geteilter WiFi-Status
//!
//! Der Event-Kontext (Connection-Task) schreibt, beliebige andere Tasks
//! lesen. Alles liegt hinter einem `blocking_mutex`, Leser bekommen immer
//! einen vollständigen Snapshot.

use core::cell::{Cell, RefCell};
use core::fmt::Write;
use core::ops::BitOr;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use heapless::String;

use crate::types::{ConnectionState, NOT_CONNECTED, WifiInfo};

/// Länge von "255.255.255.255"
pub const IP_STRING_LEN: usize = 15;

pub type IpString = String<IP_STRING_LEN>;

/// Event-Bits, die der Event-Handler setzt und der Status-Worker abholt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventFlags(u8);

impl EventFlags {
    pub const NONE: Self = Self(0);
    pub const CONNECTED: Self = Self(1 << 0);
    pub const FAIL: Self = Self(1 << 1);
    pub const GOT_IP: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for EventFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Formatiert eine IPv4-Adresse als Dotted-Quad
pub fn format_ip(addr: core::net::Ipv4Addr) -> IpString {
    let mut out = IpString::new();
    let [a, b, c, d] = addr.octets();
    // passt immer: maximal 15 Zeichen
    let _ = write!(out, "{a}.{b}.{c}.{d}");
    out
}

/// Status-Snapshot plus Event-Bits
///
/// Wird typischerweise als `static` angelegt und per `&'static` an den
/// Connection-Manager und an lesende Tasks verteilt.
pub struct WifiStatus<M: RawMutex> {
    info: Mutex<M, RefCell<WifiInfo>>,
    flags: Mutex<M, Cell<EventFlags>>,
    wake: Signal<M, ()>,
}

impl<M: RawMutex> WifiStatus<M> {
    pub const fn new() -> Self {
        Self {
            info: Mutex::new(RefCell::new(WifiInfo::new())),
            flags: Mutex::new(Cell::new(EventFlags::NONE)),
            wake: Signal::new(),
        }
    }

    /// Kopie des aktuellen Status
    pub fn snapshot(&self) -> WifiInfo {
        self.info.lock(|info| info.borrow().clone())
    }

    pub fn state(&self) -> ConnectionState {
        self.info.lock(|info| info.borrow().state)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// IP als String, nur im Zustand `Connected` - sonst "not connected"
    pub fn ip_string(&self) -> IpString {
        self.info.lock(|info| {
            let info = info.borrow();
            if info.state == ConnectionState::Connected {
                format_ip(info.ip_addr)
            } else {
                // NOT_CONNECTED ist kürzer als IP_STRING_LEN
                IpString::try_from(NOT_CONNECTED).unwrap_or_default()
            }
        })
    }

    /// Ändert den Status atomar (nur aus dem Event-Kontext aufrufen)
    pub fn update<R>(&self, f: impl FnOnce(&mut WifiInfo) -> R) -> R {
        self.info.lock(|info| f(&mut info.borrow_mut()))
    }

    /// Setzt den Status auf den Anfangszustand zurück
    pub fn reset(&self) {
        self.update(|info| *info = WifiInfo::new());
        self.flags.lock(|flags| flags.set(EventFlags::NONE));
        self.wake.reset();
    }

    /// Setzt Event-Bits und weckt den Worker
    pub fn set_flags(&self, bits: EventFlags) {
        self.flags.lock(|flags| flags.set(flags.get() | bits));
        self.wake.signal(());
    }

    pub fn clear_flags(&self, bits: EventFlags) {
        self.flags.lock(|flags| flags.set(flags.get().without(bits)));
    }

    pub fn flags(&self) -> EventFlags {
        self.flags.lock(|flags| flags.get())
    }

    /// Holt alle gesetzten Bits ab und löscht sie
    pub fn take_flags(&self) -> EventFlags {
        self.flags.lock(|flags| flags.replace(EventFlags::NONE))
    }

    /// Wartet bis mindestens ein Bit gesetzt ist und holt die Bits ab
    ///
    /// Ein Timeout ist Sache des Aufrufers (z.B. `embassy_time::with_timeout`).
    pub async fn wait_flags(&self) -> EventFlags {
        loop {
            let bits = self.take_flags();
            if !bits.is_empty() {
                return bits;
            }
            self.wake.wait().await;
        }
    }
}

impl<M: RawMutex> Default for WifiStatus<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::net::Ipv4Addr;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_format_ip() {
        assert_eq!(format_ip(Ipv4Addr::new(192, 168, 1, 42)).as_str(), "192.168.1.42");
        assert_eq!(
            format_ip(Ipv4Addr::new(255, 255, 255, 255)).as_str(),
            "255.255.255.255"
        );
    }

    #[test]
    fn test_event_flags() {
        let bits = EventFlags::CONNECTED | EventFlags::GOT_IP;
        assert!(bits.contains(EventFlags::CONNECTED));
        assert!(bits.contains(EventFlags::GOT_IP));
        assert!(!bits.contains(EventFlags::FAIL));
        assert!(!bits.contains(EventFlags::NONE));
        assert_eq!(bits.without(EventFlags::GOT_IP), EventFlags::CONNECTED);
    }

    #[test]
    fn test_take_flags_clears() {
        let status: WifiStatus<NoopRawMutex> = WifiStatus::new();
        status.set_flags(EventFlags::FAIL);
        assert_eq!(status.take_flags(), EventFlags::FAIL);
        assert!(status.flags().is_empty());
    }

    #[test]
    fn test_wait_flags_returns_pending_bits() {
        let status: WifiStatus<NoopRawMutex> = WifiStatus::new();
        status.set_flags(EventFlags::GOT_IP);
        let bits = embassy_futures::block_on(status.wait_flags());
        assert_eq!(bits, EventFlags::GOT_IP);
    }

    #[test]
    fn test_ip_string_not_connected() {
        let status: WifiStatus<NoopRawMutex> = WifiStatus::new();
        status.update(|info| info.ip_addr = Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(status.ip_string().as_str(), NOT_CONNECTED);

        status.update(|info| info.state = ConnectionState::Connected);
        assert_eq!(status.ip_string().as_str(), "10.0.0.1");
    }
}
