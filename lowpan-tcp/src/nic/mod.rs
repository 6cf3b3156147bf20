//! Attached network interfaces.
//!
//! The output path does not talk to drivers. It selects a device by its description, the
//! [`DeviceInfo`], and reads the segment the TCP state machine left in the device's
//! [`TxBuffer`]. Both are owned by the table of devices, [`Devices`], which in turn is owned by
//! the stack.
//!
//! [`DeviceInfo`]: struct.DeviceInfo.html
//! [`TxBuffer`]: struct.TxBuffer.html
//! [`Devices`]: struct.Devices.html
use core::fmt;

use crate::wire::Ipv6Cidr;

mod buffer;

pub use self::buffer::{Drain, TxBuffer};

enum_with_unknown! {
    /// The link-layer type of a device.
    pub enum LinkType(u8) {
        /// Ethernet II framing.
        Ethernet   = 0,
        /// A software loop-back.
        Loopback   = 1,
        /// Serial line IP.
        Slip       = 2,
        /// A tunnel without link-layer header.
        Tun        = 3,
        /// Bluetooth low energy.
        Bluetooth  = 4,
        /// IEEE 802.15.4, the only link type carrying 6LoWPAN frames.
        Ieee802154 = 5,
    }
}

/// Identifies one device in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub u8);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "wpan{}", self.0)
    }
}

/// A description of a device.
///
/// Everything that routing needs to know and that the frame dispatcher receives with each
/// datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The identifier of the device.
    pub id: DeviceId,
    /// The link-layer type.
    pub link_type: LinkType,
    /// The assigned address, with the prefix length of the on-link subnet.
    pub address: Ipv6Cidr,
    /// Maximum payload of a single link-layer frame.
    pub mtu: usize,
}

/// One attached interface with its transmit buffer.
#[derive(Debug)]
pub struct Device<'a> {
    /// The description of the device.
    pub info: DeviceInfo,
    /// The buffer where the TCP state machine prepares output.
    pub tx: TxBuffer<'a>,
}

/// The table of attached devices.
///
/// # Examples
///
/// ```rust
/// use lowpan_tcp::nic::{Device, DeviceId, DeviceInfo, Devices, LinkType, TxBuffer};
/// use lowpan_tcp::wire::{Ipv6Address, Ipv6Cidr};
///
/// let mut tx_storage = [0; 1280];
/// let mut devices = [Device {
///     info: DeviceInfo {
///         id: DeviceId(0),
///         link_type: LinkType::Ieee802154,
///         address: Ipv6Cidr::new(Ipv6Address::from_short_address([0, 1]), 64),
///         mtu: 127,
///     },
///     tx: TxBuffer::new(&mut tx_storage[..]),
/// }];
/// let devices = Devices::new(&mut devices[..]);
/// assert!(devices.get(DeviceId(0)).is_some());
/// ```
#[derive(Debug)]
pub struct Devices<'a> {
    storage: &'a mut [Device<'a>],
}

impl<'a> Device<'a> {
    /// Create a device with an empty transmit buffer on the given storage.
    pub fn new(info: DeviceInfo, tx_storage: &'a mut [u8]) -> Self {
        Device {
            info,
            tx: TxBuffer::new(tx_storage),
        }
    }
}

impl<'a> Devices<'a> {
    /// Create a table over the given devices.
    ///
    /// Identifiers should be unique, lookups return the first match.
    pub fn new(storage: &'a mut [Device<'a>]) -> Self {
        Devices { storage }
    }

    /// The number of devices.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no device is attached.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Find a device by its identifier.
    pub fn get(&self, id: DeviceId) -> Option<&Device<'a>> {
        self.storage.iter().find(|dev| dev.info.id == id)
    }

    /// Find a device by its identifier, mutably.
    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device<'a>> {
        self.storage.iter_mut().find(|dev| dev.info.id == id)
    }

    /// Iterate over the descriptions of all devices.
    pub fn infos(&self) -> impl Iterator<Item=&DeviceInfo> + '_ {
        self.storage.iter().map(|dev| &dev.info)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::Ipv6Address;

    fn info(id: u8, link_type: LinkType) -> DeviceInfo {
        DeviceInfo {
            id: DeviceId(id),
            link_type,
            address: Ipv6Cidr::new(Ipv6Address::from_short_address([0, id]), 64),
            mtu: 127,
        }
    }

    #[test]
    fn lookup_by_id() {
        let mut buf_a = [0; 64];
        let mut buf_b = [0; 64];
        let mut storage = [
            Device::new(info(1, LinkType::Ethernet), &mut buf_a[..]),
            Device::new(info(2, LinkType::Ieee802154), &mut buf_b[..]),
        ];
        let mut devices = Devices::new(&mut storage[..]);

        assert_eq!(devices.len(), 2);
        assert_eq!(devices.get(DeviceId(2)).map(|dev| dev.info.link_type), Some(LinkType::Ieee802154));
        assert!(devices.get(DeviceId(3)).is_none());
        assert!(devices.get_mut(DeviceId(1)).is_some());
        assert_eq!(devices.infos().count(), 2);
    }

    #[test]
    fn link_type_repr() {
        assert_eq!(LinkType::from(5), LinkType::Ieee802154);
        assert_eq!(LinkType::from(42), LinkType::Unknown(42));
        assert_eq!(u8::from(LinkType::Unknown(42)), 42);
    }
}
