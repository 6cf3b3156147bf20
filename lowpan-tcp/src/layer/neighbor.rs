//! Reachability of on-link peers.
//!
//! Link addresses of 6LoWPAN neighbors follow from their IPv6 address, so the cache does not
//! serve address resolution. It records which peers have been confirmed recently by neighbor
//! discovery, and routing refuses to send to anyone else.
use crate::time::{Duration, Expiration, Instant};
use crate::wire::{Ipv6Address, LinkAddress};

/// Answers whether a peer is a confirmed neighbor.
pub trait Neighbors {
    /// Look up a peer at the given time.
    ///
    /// Returns the link address it was confirmed with, or `None` if it is unknown or expired.
    fn lookup(&self, addr: Ipv6Address, now: Instant) -> Option<LinkAddress>;
}

/// A confirmed neighbor.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    protocol_addr: Ipv6Address,
    hardware_addr: LinkAddress,
    expires_at:    Expiration,
}

/// Errors when filling the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// There as no space to add the entry.
    ///
    /// The storage is empty or holds only entries that never expire.
    NoSpace,

    /// All other entries that could be evicted live longer.
    ExpiresTooSoon,
}

/// A neighbor cache backed by a slice.
///
/// # Examples
///
/// ```rust
/// use lowpan_tcp::layer::neighbor::{Cache, Neighbor, Neighbors};
/// use lowpan_tcp::time::Instant;
/// use lowpan_tcp::wire::{Ipv6Address, LinkAddress};
///
/// let mut storage = [Neighbor::default(); 8];
/// let mut cache = Cache::new(&mut storage[..]);
///
/// let peer = Ipv6Address::from_short_address([0x00, 0x02]);
/// cache.fill(peer, LinkAddress([0x00, 0x02]), Some(Instant::from_secs(0))).unwrap();
/// assert!(cache.lookup(peer, Instant::from_secs(1)).is_some());
/// ```
#[derive(Debug)]
pub struct Cache<'a> {
    storage: &'a mut [Neighbor],
    len: usize,
}

impl<'a> Cache<'a> {
    /// Neighbor entry lifetime.
    pub const ENTRY_LIFETIME: Duration = Duration::from_secs(60);

    /// Create a logically empty cache.
    pub fn new(storage: &'a mut [Neighbor]) -> Self {
        Cache { storage, len: 0 }
    }

    /// The number of entries, including expired ones.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The occupied entries.
    pub fn entries(&self) -> &[Neighbor] {
        &self.storage[..self.len]
    }

    /// Record a confirmation of a neighbor.
    ///
    /// Provide the current timestamp or `None` to disable expiration. An existing entry for the
    /// address is refreshed. When the storage is full the entry expiring first is evicted, unless
    /// it would outlive the new one.
    pub fn fill(
        &mut self,
        protocol_addr: Ipv6Address,
        hardware_addr: LinkAddress,
        timestamp: Option<Instant>,
    ) -> Result<(), Error> {
        debug_assert!(protocol_addr.is_unicast());

        let new_neighbor = Neighbor {
            protocol_addr,
            hardware_addr,
            expires_at: timestamp.map(|ts| ts + Self::ENTRY_LIFETIME).into(),
        };

        if let Some(entry) = self.storage[..self.len]
            .iter_mut()
            .find(|neighbor| neighbor.protocol_addr == protocol_addr)
        {
            net_trace!("refreshed neighbor {} at {}", protocol_addr, hardware_addr);
            *entry = new_neighbor;
            return Ok(());
        }

        if self.len < self.storage.len() {
            self.storage[self.len] = new_neighbor;
            self.len += 1;
            return Ok(());
        }

        // Find the oldest entry.
        let (idx, oldest) = self.storage
            .iter()
            .enumerate()
            .min_by_key(|(_, neighbor)| neighbor.expires_at)
            .ok_or(Error::NoSpace)?;
        if oldest.expires_at == Expiration::Never {
            return Err(Error::NoSpace);
        }
        if oldest.expires_at > new_neighbor.expires_at {
            return Err(Error::ExpiresTooSoon);
        }

        self.storage[idx] = new_neighbor;
        Ok(())
    }

    /// Forget a neighbor.
    pub fn remove(&mut self, protocol_addr: Ipv6Address) -> Option<Neighbor> {
        let idx = self.storage[..self.len]
            .iter()
            .position(|neighbor| neighbor.protocol_addr == protocol_addr)?;
        let removed = self.storage[idx];
        self.storage.swap(idx, self.len - 1);
        self.len -= 1;
        Some(removed)
    }
}

impl Neighbors for Cache<'_> {
    fn lookup(&self, addr: Ipv6Address, now: Instant) -> Option<LinkAddress> {
        self.entries()
            .iter()
            .find(|neighbor| neighbor.protocol_addr == addr)
            .filter(|neighbor| neighbor.is_alive(now))
            .map(|neighbor| neighbor.hardware_addr)
    }
}

impl<N: Neighbors + ?Sized> Neighbors for &'_ N {
    fn lookup(&self, addr: Ipv6Address, now: Instant) -> Option<LinkAddress> {
        (**self).lookup(addr, now)
    }
}

impl<N: Neighbors + ?Sized> Neighbors for &'_ mut N {
    fn lookup(&self, addr: Ipv6Address, now: Instant) -> Option<LinkAddress> {
        (**self).lookup(addr, now)
    }
}

impl Neighbor {
    /// The IPv6 address of the neighbor.
    pub fn protocol_addr(&self) -> Ipv6Address {
        self.protocol_addr
    }

    /// The link address it was confirmed with.
    pub fn hardware_addr(&self) -> LinkAddress {
        self.hardware_addr
    }

    /// Check if the confirmation still holds.
    pub fn is_alive(&self, ts: Instant) -> bool {
        !self.expires_at.is_expired(ts)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn peer(short: u8) -> (Ipv6Address, LinkAddress) {
        (Ipv6Address::from_short_address([0, short]), LinkAddress([0, short]))
    }

    #[test]
    fn fill_and_lookup() {
        let mut storage = [Neighbor::default(); 2];
        let mut cache = Cache::new(&mut storage[..]);
        let (addr, hw) = peer(2);

        assert_eq!(cache.lookup(addr, Instant::from_secs(0)), None);
        cache.fill(addr, hw, Some(Instant::from_secs(0))).unwrap();
        assert_eq!(cache.lookup(addr, Instant::from_secs(59)), Some(hw));
        assert_eq!(cache.lookup(addr, Instant::from_secs(60)), None);
    }

    #[test]
    fn refresh_keeps_one_entry() {
        let mut storage = [Neighbor::default(); 2];
        let mut cache = Cache::new(&mut storage[..]);
        let (addr, hw) = peer(2);

        cache.fill(addr, hw, Some(Instant::from_secs(0))).unwrap();
        cache.fill(addr, hw, Some(Instant::from_secs(50))).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(addr, Instant::from_secs(100)), Some(hw));
    }

    #[test]
    fn evict_oldest() {
        let mut storage = [Neighbor::default(); 2];
        let mut cache = Cache::new(&mut storage[..]);
        let (a, hw_a) = peer(1);
        let (b, hw_b) = peer(2);
        let (c, hw_c) = peer(3);

        cache.fill(a, hw_a, Some(Instant::from_secs(0))).unwrap();
        cache.fill(b, hw_b, Some(Instant::from_secs(10))).unwrap();
        cache.fill(c, hw_c, Some(Instant::from_secs(20))).unwrap();

        let now = Instant::from_secs(21);
        assert_eq!(cache.lookup(a, now), None);
        assert_eq!(cache.lookup(b, now), Some(hw_b));
        assert_eq!(cache.lookup(c, now), Some(hw_c));
    }

    #[test]
    fn full_of_permanent_entries() {
        let mut storage = [Neighbor::default(); 1];
        let mut cache = Cache::new(&mut storage[..]);
        let (a, hw_a) = peer(1);
        let (b, hw_b) = peer(2);

        cache.fill(a, hw_a, None).unwrap();
        assert_eq!(cache.fill(b, hw_b, Some(Instant::from_secs(0))), Err(Error::NoSpace));
        assert_eq!(cache.lookup(a, Instant::from_secs(1_000_000)), Some(hw_a));
    }

    #[test]
    fn new_entry_expires_too_soon() {
        let mut storage = [Neighbor::default(); 1];
        let mut cache = Cache::new(&mut storage[..]);
        let (a, hw_a) = peer(1);
        let (b, hw_b) = peer(2);

        cache.fill(a, hw_a, Some(Instant::from_secs(100))).unwrap();
        assert_eq!(cache.fill(b, hw_b, Some(Instant::from_secs(0))), Err(Error::ExpiresTooSoon));
    }

    #[test]
    fn remove() {
        let mut storage = [Neighbor::default(); 2];
        let mut cache = Cache::new(&mut storage[..]);
        let (a, hw_a) = peer(1);

        cache.fill(a, hw_a, None).unwrap();
        assert_eq!(cache.remove(a).map(|n| n.hardware_addr()), Some(hw_a));
        assert!(cache.is_empty());
        assert!(cache.remove(a).is_none());
    }
}
