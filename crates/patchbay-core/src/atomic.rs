//! Lock-free value cells for the control/audio thread boundary.
//!
//! [`AtomicValue`] is a double-buffered cell: one writer publishes through a
//! four-state tag while any number of readers load the currently readable slot
//! without waiting. [`AtomicLock`] is a small reentrant spin lock built on top
//! of it.
//!
//! Values are stored as raw bit patterns in `AtomicU64` slots (the usual trick
//! for keeping an `f32` in an `AtomicU32`), so a reader can never
//! observe a half-written value and no `unsafe` is needed.
//!
//! # Writer discipline
//!
//! Correctness assumes a single logical writer per cell. Two threads calling
//! [`AtomicValue::set`] concurrently will not corrupt the cell, but one of them
//! fails, and two threads spinning in [`AtomicValue::exchange`] can starve each
//! other indefinitely.

use std::hint;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, AtomicUsize, Ordering};

/// Word-sized values that can live in an [`AtomicValue`].
///
/// Implementors convert losslessly to and from a `u64` bit pattern.
pub trait AtomicRepr: Copy + Send + Sync + 'static {
    /// Encodes the value as raw bits.
    fn into_bits(self) -> u64;
    /// Decodes a value previously produced by [`into_bits`](Self::into_bits).
    fn from_bits(bits: u64) -> Self;
}

impl AtomicRepr for f32 {
    #[inline]
    fn into_bits(self) -> u64 {
        u64::from(self.to_bits())
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl AtomicRepr for f64 {
    #[inline]
    fn into_bits(self) -> u64 {
        self.to_bits()
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

impl AtomicRepr for i32 {
    #[inline]
    fn into_bits(self) -> u64 {
        u64::from(self as u32)
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits as u32 as i32
    }
}

impl AtomicRepr for u32 {
    #[inline]
    fn into_bits(self) -> u64 {
        u64::from(self)
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits as u32
    }
}

impl AtomicRepr for i64 {
    #[inline]
    fn into_bits(self) -> u64 {
        self as u64
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits as i64
    }
}

impl AtomicRepr for u64 {
    #[inline]
    fn into_bits(self) -> u64 {
        self
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits
    }
}

impl AtomicRepr for usize {
    #[inline]
    fn into_bits(self) -> u64 {
        self as u64
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits as usize
    }
}

impl AtomicRepr for bool {
    #[inline]
    fn into_bits(self) -> u64 {
        u64::from(self)
    }
    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits != 0
    }
}

/// Publication state of an [`AtomicValue`].
///
/// The cell alternates between two stable states. A writer claims one of the
/// two transient "lock" states, fills the slot readers are *not* looking at,
/// flips the read index and releases into the other stable state.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    /// Readers use slot 0; slot 1 is free for the next write.
    ReadWrite = 0,
    /// A writer is filling slot 1.
    ReadLock = 1,
    /// Readers use slot 1; slot 0 is free for the next write.
    WriteRead = 2,
    /// A writer is filling slot 0.
    LockRead = 3,
}

/// Single-writer, wait-free-read double-buffered value cell.
///
/// [`get`](Self::get) never blocks and is safe from any number of threads.
/// [`set`](Self::set) makes one non-blocking publish attempt and reports
/// whether it won; [`exchange`](Self::exchange) retries until it does.
///
/// # Example
///
/// ```
/// use patchbay_core::AtomicValue;
///
/// let gain = AtomicValue::new(1.0_f32);
/// assert!(gain.set(0.5));
/// assert_eq!(gain.exchange(0.25), 0.5);
/// assert_eq!(gain.get(), 0.25);
/// ```
pub struct AtomicValue<T: AtomicRepr> {
    state: AtomicU8,
    read_slot: AtomicUsize,
    slots: [AtomicU64; 2],
    _value: PhantomData<T>,
}

impl<T: AtomicRepr> AtomicValue<T> {
    /// Creates a cell publishing `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            state: AtomicU8::new(SlotState::ReadWrite as u8),
            read_slot: AtomicUsize::new(0),
            slots: [AtomicU64::new(initial.into_bits()), AtomicU64::new(0)],
            _value: PhantomData,
        }
    }

    /// Returns the currently published value.
    #[inline]
    pub fn get(&self) -> T {
        let slot = self.read_slot.load(Ordering::Acquire);
        T::from_bits(self.slots[slot].load(Ordering::Acquire))
    }

    /// Attempts to publish `value` without blocking.
    ///
    /// Returns `false` if another writer is mid-publish; the cell is unchanged.
    pub fn set(&self, value: T) -> bool {
        let bits = value.into_bits();
        if self.claim(SlotState::ReadWrite, SlotState::ReadLock) {
            self.publish(1, bits, SlotState::WriteRead);
            true
        } else if self.claim(SlotState::WriteRead, SlotState::LockRead) {
            self.publish(0, bits, SlotState::ReadWrite);
            true
        } else {
            false
        }
    }

    /// Publishes `value`, spinning until the write lands, and returns the
    /// value it replaced.
    pub fn exchange(&self, value: T) -> T {
        let previous = self.get();
        while !self.set(value) {
            hint::spin_loop();
        }
        previous
    }

    /// Publishes `value` and hands the replaced value to `release`.
    ///
    /// Use this when the stored word is a handle to something the cell owned,
    /// such as a slot index to return to a pool.
    pub fn exchange_and_release(&self, value: T, release: impl FnOnce(T)) {
        release(self.exchange(value));
    }

    fn claim(&self, from: SlotState, to: SlotState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    fn publish(&self, slot: usize, bits: u64, next: SlotState) {
        self.slots[slot].store(bits, Ordering::Release);
        self.read_slot.store(slot, Ordering::Release);
        self.state.store(next as u8, Ordering::Release);
    }
}

impl<T: AtomicRepr + Default> Default for AtomicValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: AtomicRepr + core::fmt::Debug> core::fmt::Debug for AtomicValue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicValue").field(&self.get()).finish()
    }
}

/// Reentrant spin lock without owner tracking.
///
/// A recursion counter held in an [`AtomicValue<i32>`] plus a test-and-set
/// flag. Only the 0 → 1 transition of the counter spins for the flag, and the
/// flag is released once the counter drops below 1. Because the owner thread is
/// not recorded, nested `lock` calls are only sound when the same logical
/// owner performs matched `lock`/`unlock` pairs.
#[derive(Debug, Default)]
pub struct AtomicLock {
    locks: AtomicValue<i32>,
    flag: AtomicBool,
}

impl AtomicLock {
    /// Creates an unlocked lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the recursion count, spinning for the flag on first entry.
    pub fn lock(&self) {
        let count = self.locks.get() + 1;
        self.locks.exchange(count);
        if count == 1 {
            while !self.acquire() {
                hint::spin_loop();
            }
        }
    }

    /// Decrements the recursion count, releasing the flag when it reaches zero.
    pub fn unlock(&self) {
        let count = self.locks.get() - 1;
        self.locks.exchange(count);
        if count < 1 {
            self.locks.exchange(0);
            self.release();
        }
    }

    /// Returns `true` while the recursion count is positive.
    pub fn is_busy(&self) -> bool {
        self.locks.get() > 0
    }

    /// Single test-and-set on the flag. Returns `true` if the flag was clear.
    pub fn acquire(&self) -> bool {
        !self.flag.swap(true, Ordering::Acquire)
    }

    /// Clears the flag.
    pub fn release(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Locks and returns a guard that unlocks on drop.
    pub fn guard(&self) -> AtomicLockGuard<'_> {
        self.lock();
        AtomicLockGuard { lock: self }
    }
}

/// Scoped [`AtomicLock`] hold, released on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct AtomicLockGuard<'a> {
    lock: &'a AtomicLock,
}

impl Drop for AtomicLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new_publishes_initial_value() {
        let cell = AtomicValue::new(0.75_f32);
        assert_eq!(cell.get(), 0.75);
    }

    #[test]
    fn set_alternates_slots() {
        let cell = AtomicValue::new(1_i32);
        for value in 2..10 {
            assert!(cell.set(value));
            assert_eq!(cell.get(), value);
        }
    }

    #[test]
    fn exchange_returns_previous() {
        let cell = AtomicValue::new(3_u64);
        assert_eq!(cell.exchange(4), 3);
        assert_eq!(cell.exchange(5), 4);
        assert_eq!(cell.get(), 5);
    }

    #[test]
    fn exchange_and_release_hands_over_old_value() {
        let cell = AtomicValue::new(7_usize);
        let mut released = None;
        cell.exchange_and_release(9, |old| released = Some(old));
        assert_eq!(released, Some(7));
        assert_eq!(cell.get(), 9);
    }

    #[test]
    fn set_fails_while_writer_holds_claim() {
        let cell = AtomicValue::new(false);
        assert!(cell.claim(SlotState::ReadWrite, SlotState::ReadLock));
        assert!(!cell.set(true));
        assert!(!cell.get());
        cell.publish(1, AtomicRepr::into_bits(true), SlotState::WriteRead);
        assert!(cell.get());
        assert!(cell.set(false));
    }

    #[test]
    fn repr_round_trips_edge_values() {
        assert_eq!(<i32 as AtomicRepr>::from_bits((-5_i32).into_bits()), -5);
        assert_eq!(<i64 as AtomicRepr>::from_bits(i64::MIN.into_bits()), i64::MIN);
        assert!(<f32 as AtomicRepr>::from_bits(AtomicRepr::into_bits(f32::NAN)).is_nan());
        assert_eq!(
            <f64 as AtomicRepr>::from_bits(AtomicRepr::into_bits(-0.125_f64)),
            -0.125
        );
    }

    #[test]
    fn readers_only_see_published_values() {
        let cell = Arc::new(AtomicValue::new(0_u64));
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 1..=20_000_u64 {
                    cell.exchange(i * 3);
                }
            })
        };
        let readers: Vec<_> = (0..3)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..20_000 {
                        let v = cell.get();
                        assert_eq!(v % 3, 0, "torn or foreign value {v}");
                        assert!(v <= 60_000);
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(cell.get(), 60_000);
    }

    #[test]
    fn lock_is_reentrant() {
        let lock = AtomicLock::new();
        assert!(!lock.is_busy());
        lock.lock();
        lock.lock();
        assert!(lock.is_busy());
        lock.unlock();
        assert!(lock.is_busy());
        lock.unlock();
        assert!(!lock.is_busy());
        assert!(lock.acquire(), "flag must be clear after final unlock");
        lock.release();
    }

    #[test]
    fn unbalanced_unlock_resets_count() {
        let lock = AtomicLock::new();
        lock.unlock();
        assert!(!lock.is_busy());
        lock.lock();
        assert!(lock.is_busy());
        lock.unlock();
        assert!(!lock.is_busy());
    }

    #[test]
    fn acquire_is_single_test_and_set() {
        let lock = AtomicLock::new();
        assert!(lock.acquire());
        assert!(!lock.acquire());
        lock.release();
        assert!(lock.acquire());
    }

    #[test]
    fn guard_unlocks_on_drop() {
        let lock = AtomicLock::new();
        {
            let _held = lock.guard();
            assert!(lock.is_busy());
        }
        assert!(!lock.is_busy());
    }
}
