use super::{Config, Dispatch, Resolve, Router};
use super::neighbor::Neighbors;
use crate::nic::Devices;
use crate::time::Instant;

/// Everything the output path operates on.
///
/// Meant to be placed behind a [`NetLock`], the operations in [`output`] only accept it through
/// the guard.
///
/// [`NetLock`]: struct.NetLock.html
/// [`output`]: output/index.html
#[derive(Debug)]
pub struct Stack<'a, R, D> {
    devices: Devices<'a>,
    resolver: R,
    dispatcher: D,
    config: Config,
    now: Instant,
}

impl<'a, N: Neighbors, D: Dispatch> Stack<'a, Router<N>, D> {
    /// Create a stack routing with the configured strategy.
    pub fn new(devices: Devices<'a>, neighbors: N, dispatcher: D, config: Config) -> Self {
        let resolver = Router::new(config.routing, neighbors, config.neighbor_confirmation);
        Stack::with_resolver(devices, resolver, dispatcher, config)
    }

    /// The neighbor cache used for reachability confirmation.
    pub fn neighbors_mut(&mut self) -> &mut N {
        self.resolver.neighbors_mut()
    }
}

impl<'a, R: Resolve, D: Dispatch> Stack<'a, R, D> {
    /// Create a stack with a custom route resolver.
    ///
    /// The routing strategy and neighbor confirmation of the configuration are then up to the
    /// resolver.
    pub fn with_resolver(devices: Devices<'a>, resolver: R, dispatcher: D, config: Config) -> Self {
        Stack {
            devices,
            resolver,
            dispatcher,
            config,
            now: Instant::from_millis(0),
        }
    }

    /// Update the current time, used for neighbor expiry.
    pub fn set_timestamp(&mut self, now: Instant) {
        self.now = now;
    }

    /// The current time.
    pub fn timestamp(&self) -> Instant {
        self.now
    }

    /// The attached devices.
    pub fn devices(&self) -> &Devices<'a> {
        &self.devices
    }

    /// The attached devices, for the state machine to prepare output.
    pub fn devices_mut(&mut self) -> &mut Devices<'a> {
        &mut self.devices
    }

    /// The frame dispatcher.
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// The frame dispatcher, mutably.
    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Split into the parts used during one send.
    pub(crate) fn parts(&mut self) -> Parts<'_, 'a, R, D> {
        Parts {
            devices: &mut self.devices,
            resolver: &mut self.resolver,
            dispatcher: &mut self.dispatcher,
            config: &self.config,
            now: self.now,
        }
    }
}

/// Disjoint borrows of the stack.
pub(crate) struct Parts<'s, 'a, R, D> {
    pub(crate) devices: &'s mut Devices<'a>,
    pub(crate) resolver: &'s mut R,
    pub(crate) dispatcher: &'s mut D,
    pub(crate) config: &'s Config,
    pub(crate) now: Instant,
}
