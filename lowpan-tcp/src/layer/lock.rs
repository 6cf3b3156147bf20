use core::ops;

use spin::{Mutex, MutexGuard};

/// The global lock of the network stack.
///
/// Every operation of the output path takes the guard as an argument. Holding the guard for the
/// whole operation serializes access to devices, sockets and the neighbor cache, and also keeps
/// the state machine from writing into a transmit buffer that is being flushed.
#[derive(Debug)]
pub struct NetLock<T> {
    inner: Mutex<T>,
}

/// Proof that the network lock is held.
///
/// Dereferences to the protected stack. The lock is released when the guard is dropped.
pub struct NetGuard<'a, T> {
    inner: MutexGuard<'a, T>,
}

impl<T> NetLock<T> {
    /// Place a stack behind the lock.
    pub const fn new(inner: T) -> Self {
        NetLock { inner: Mutex::new(inner) }
    }

    /// Acquire the lock, spinning until it is available.
    pub fn lock(&self) -> NetGuard<'_, T> {
        NetGuard { inner: self.inner.lock() }
    }

    /// Try to acquire the lock without waiting.
    pub fn try_lock(&self) -> Option<NetGuard<'_, T>> {
        self.inner.try_lock().map(|inner| NetGuard { inner })
    }

    /// Take back the stack.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T> ops::Deref for NetGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> ops::DerefMut for NetGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exclusive() {
        let lock = NetLock::new(0u32);
        {
            let mut guard = lock.lock();
            *guard += 1;
            assert!(lock.try_lock().is_none());
        }
        assert_eq!(lock.try_lock().map(|guard| *guard), Some(1));
        assert_eq!(lock.into_inner(), 1);
    }
}
