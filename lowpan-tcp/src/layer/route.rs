//! Selection of the outbound device.
//!
//! Routing is a two step decision. First a device is chosen by the address pair of the
//! connection, then the peer must be a confirmed neighbor on it. Which devices qualify depends on
//! the configured strategy:
//!
//! * [`SingleDevice`]: the device whose subnet contains the peer. Any link type.
//! * [`MultiDevice`]: the device bound to the local address of the connection, or the first one
//!   whose subnet contains the peer if the connection is not bound. Only 802.15.4 devices carry
//!   6LoWPAN frames, a match of another type is not a route.
//!
//! [`SingleDevice`]: struct.SingleDevice.html
//! [`MultiDevice`]: struct.MultiDevice.html
use core::fmt;

use super::{Error, FnHandler};
use super::neighbor::Neighbors;
use super::socket::Connection;
use crate::nic::{DeviceId, DeviceInfo, Devices, LinkType};
use crate::time::Instant;

/// Why no route was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteError {
    /// No device qualifies for the address pair.
    NoDevice,
    /// The peer is not a confirmed neighbor.
    Unreachable,
}

/// The configured routing strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Routing {
    /// One interface, selected by subnet.
    Single,
    /// Multiple interfaces, selected by local address and link type.
    Multi,
}

/// Resolves the outbound device of a connection.
pub trait Resolve {
    /// Select the device for the connection or fail.
    fn resolve(&mut self, devices: &Devices, conn: &Connection, now: Instant)
        -> Result<DeviceId, RouteError>;
}

/// Routing for a stack with one attached interface.
#[derive(Debug)]
pub struct SingleDevice<N> {
    neighbors: N,
    confirm: bool,
}

/// Routing for a stack with several attached interfaces.
#[derive(Debug)]
pub struct MultiDevice<N> {
    neighbors: N,
    confirm: bool,
}

/// The resolver selected by [`Routing`].
///
/// [`Routing`]: enum.Routing.html
#[derive(Debug)]
pub enum Router<N> {
    /// Single device strategy.
    Single(SingleDevice<N>),
    /// Multi device strategy.
    Multi(MultiDevice<N>),
}

impl<N: Neighbors> SingleDevice<N> {
    /// Create the resolver.
    ///
    /// With `confirm` set the peer must be found in `neighbors`.
    pub fn new(neighbors: N, confirm: bool) -> Self {
        SingleDevice { neighbors, confirm }
    }

    fn select<'d>(devices: &'d Devices, conn: &Connection) -> Option<&'d DeviceInfo> {
        devices.infos().find(|info| info.address.contains(conn.remote.addr))
    }
}

impl<N: Neighbors> MultiDevice<N> {
    /// Create the resolver.
    ///
    /// With `confirm` set the peer must be found in `neighbors`.
    pub fn new(neighbors: N, confirm: bool) -> Self {
        MultiDevice { neighbors, confirm }
    }

    fn select<'d>(devices: &'d Devices, conn: &Connection) -> Option<&'d DeviceInfo> {
        let local = conn.local.addr;
        let candidate = if local.is_unspecified() {
            devices.infos().find(|info| info.address.contains(conn.remote.addr))
        } else {
            devices.infos().find(|info| info.address.address() == local)
        }?;

        match candidate.link_type {
            LinkType::Ieee802154 => Some(candidate),
            other => {
                net_debug!("device {} has link type {:?}, not routable", candidate.id, other);
                None
            },
        }
    }
}

impl<N: Neighbors> Router<N> {
    /// Create the resolver for a routing strategy.
    pub fn new(routing: Routing, neighbors: N, confirm: bool) -> Self {
        match routing {
            Routing::Single => Router::Single(SingleDevice::new(neighbors, confirm)),
            Routing::Multi => Router::Multi(MultiDevice::new(neighbors, confirm)),
        }
    }

    /// The neighbor cache consulted for confirmation.
    pub fn neighbors(&self) -> &N {
        match self {
            Router::Single(single) => &single.neighbors,
            Router::Multi(multi) => &multi.neighbors,
        }
    }

    /// The neighbor cache, for filling it from neighbor discovery.
    pub fn neighbors_mut(&mut self) -> &mut N {
        match self {
            Router::Single(single) => &mut single.neighbors,
            Router::Multi(multi) => &mut multi.neighbors,
        }
    }
}

/// Finish resolution for a selected candidate.
fn confirm<N: Neighbors>(
    candidate: Option<&DeviceInfo>,
    neighbors: &N,
    required: bool,
    conn: &Connection,
    now: Instant,
) -> Result<DeviceId, RouteError> {
    let remote = conn.remote.addr;
    let device = match candidate {
        Some(device) => device,
        None => {
            net_warn!("no device routes to {}", remote);
            return Err(RouteError::NoDevice);
        },
    };

    if required && neighbors.lookup(remote, now).is_none() {
        net_error!("{} is not a neighbor on {}", remote, device.id);
        return Err(RouteError::Unreachable);
    }

    Ok(device.id)
}

impl<N: Neighbors> Resolve for SingleDevice<N> {
    fn resolve(&mut self, devices: &Devices, conn: &Connection, now: Instant)
        -> Result<DeviceId, RouteError>
    {
        let candidate = Self::select(devices, conn);
        confirm(candidate, &self.neighbors, self.confirm, conn, now)
    }
}

impl<N: Neighbors> Resolve for MultiDevice<N> {
    fn resolve(&mut self, devices: &Devices, conn: &Connection, now: Instant)
        -> Result<DeviceId, RouteError>
    {
        let candidate = Self::select(devices, conn);
        confirm(candidate, &self.neighbors, self.confirm, conn, now)
    }
}

impl<N: Neighbors> Resolve for Router<N> {
    fn resolve(&mut self, devices: &Devices, conn: &Connection, now: Instant)
        -> Result<DeviceId, RouteError>
    {
        match self {
            Router::Single(single) => single.resolve(devices, conn, now),
            Router::Multi(multi) => multi.resolve(devices, conn, now),
        }
    }
}

impl<F> Resolve for FnHandler<F>
    where F: FnMut(&Devices<'_>, &Connection, Instant) -> Result<DeviceId, RouteError>
{
    fn resolve(&mut self, devices: &Devices, conn: &Connection, now: Instant)
        -> Result<DeviceId, RouteError>
    {
        (self.0)(devices, conn, now)
    }
}

impl<R: Resolve + ?Sized> Resolve for &'_ mut R {
    fn resolve(&mut self, devices: &Devices, conn: &Connection, now: Instant)
        -> Result<DeviceId, RouteError>
    {
        (**self).resolve(devices, conn, now)
    }
}

impl From<RouteError> for Error {
    fn from(_: RouteError) -> Self {
        Error::NotRoutable
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteError::NoDevice => write!(f, "no suitable device"),
            RouteError::Unreachable => write!(f, "peer is not a confirmed neighbor"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layer::neighbor::{Cache, Neighbor};
    use crate::layer::socket::Endpoint;
    use crate::nic::Device;
    use crate::wire::{Ipv6Address, Ipv6Cidr, LinkAddress};

    const PEER: Ipv6Address = Ipv6Address::from_short_address([0x00, 0x02]);
    const HOST: Ipv6Address = Ipv6Address::from_short_address([0x00, 0x01]);

    fn info(id: u8, link_type: LinkType, addr: Ipv6Address) -> DeviceInfo {
        DeviceInfo {
            id: DeviceId(id),
            link_type,
            address: Ipv6Cidr::new(addr, 64),
            mtu: 127,
        }
    }

    fn conn(local: Ipv6Address) -> Connection {
        Connection::established(Endpoint::new(local, 49152), Endpoint::new(PEER, 80))
    }

    #[test]
    fn single_ignores_link_type() {
        let mut buf = [0; 8];
        let mut storage = [Device::new(info(0, LinkType::Ethernet, HOST), &mut buf[..])];
        let devices = Devices::new(&mut storage[..]);

        let mut neighbors = [Neighbor::default(); 1];
        let mut cache = Cache::new(&mut neighbors[..]);
        cache.fill(PEER, LinkAddress([0x00, 0x02]), None).unwrap();

        let mut router = Router::new(Routing::Single, cache, true);
        let now = Instant::from_secs(0);
        assert_eq!(router.resolve(&devices, &conn(HOST), now), Ok(DeviceId(0)));
    }

    #[test]
    fn multi_requires_802154() {
        let mut buf_a = [0; 8];
        let mut buf_b = [0; 8];
        let other = Ipv6Address::new(0xfe80, 0, 0, 0, 0, 0, 0, 0x42);
        let mut storage = [
            Device::new(info(0, LinkType::Ethernet, other), &mut buf_a[..]),
            Device::new(info(1, LinkType::Ieee802154, HOST), &mut buf_b[..]),
        ];
        let devices = Devices::new(&mut storage[..]);

        let mut neighbors = [Neighbor::default(); 1];
        let mut router = Router::new(Routing::Multi, Cache::new(&mut neighbors[..]), false);
        let now = Instant::from_secs(0);

        assert_eq!(router.resolve(&devices, &conn(HOST), now), Ok(DeviceId(1)));
        assert_eq!(router.resolve(&devices, &conn(other), now), Err(RouteError::NoDevice));
        // Unbound connections take the first device on the subnet.
        assert_eq!(
            router.resolve(&devices, &conn(Ipv6Address::UNSPECIFIED), now),
            Err(RouteError::NoDevice));
    }

    #[test]
    fn unconfirmed_neighbor() {
        let mut buf = [0; 8];
        let mut storage = [Device::new(info(0, LinkType::Ieee802154, HOST), &mut buf[..])];
        let devices = Devices::new(&mut storage[..]);

        let mut neighbors = [Neighbor::default(); 1];
        let mut router = Router::new(Routing::Single, Cache::new(&mut neighbors[..]), true);
        let now = Instant::from_secs(0);
        assert_eq!(router.resolve(&devices, &conn(HOST), now), Err(RouteError::Unreachable));

        router.neighbors_mut().fill(PEER, LinkAddress([0x00, 0x02]), Some(now)).unwrap();
        assert_eq!(router.neighbors().lookup(PEER, now), Some(LinkAddress([0x00, 0x02])));
        assert_eq!(router.resolve(&devices, &conn(HOST), now), Ok(DeviceId(0)));
        assert_eq!(
            router.resolve(&devices, &conn(HOST), now + Cache::ENTRY_LIFETIME),
            Err(RouteError::Unreachable));
    }

    #[test]
    fn no_subnet_match() {
        let mut buf = [0; 8];
        let site = Ipv6Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
        let mut storage = [Device::new(info(0, LinkType::Ieee802154, site), &mut buf[..])];
        let devices = Devices::new(&mut storage[..]);

        let mut neighbors = [Neighbor::default(); 1];
        let mut router = Router::new(Routing::Single, Cache::new(&mut neighbors[..]), false);
        assert_eq!(
            router.resolve(&devices, &conn(site), Instant::from_secs(0)),
            Err(RouteError::NoDevice));
    }

    fn resolver<F>(f: F) -> FnHandler<F>
        where F: FnMut(&Devices<'_>, &Connection, Instant) -> Result<DeviceId, RouteError>
    {
        FnHandler(f)
    }

    #[test]
    fn closure_resolver() {
        let mut buf = [0; 8];
        let mut storage = [Device::new(info(3, LinkType::Ieee802154, HOST), &mut buf[..])];
        let devices = Devices::new(&mut storage[..]);

        let mut calls = 0;
        let mut resolver = resolver(|_, _, _| {
            calls += 1;
            Ok(DeviceId(3))
        });
        assert_eq!(resolver.resolve(&devices, &conn(HOST), Instant::from_secs(0)), Ok(DeviceId(3)));
        drop(resolver);
        assert_eq!(calls, 1);
    }
}
