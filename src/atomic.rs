use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free f64 cell. The float is stored as its raw bits in an
/// [`AtomicU64`], so loads and stores are a single atomic op and `add` is a
/// compare-and-swap loop over the bit pattern.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Replace the value, returning whatever was there before.
    pub fn swap(&self, value: f64) -> f64 {
        f64::from_bits(self.bits.swap(value.to_bits(), Ordering::Relaxed))
    }

    /// Add `delta` to the current value. Retries until our CAS wins, there is no
    /// bound on the number of attempts.
    pub fn add(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.bits.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::AtomicF64;

    #[test]
    fn add_set_swap() {
        let cell = AtomicF64::default();
        assert_eq!(cell.get(), 0.0);
        cell.add(1.5);
        cell.add(-0.25);
        assert_eq!(cell.get(), 1.25);
        cell.set(10.0);
        assert_eq!(cell.swap(2.0), 10.0);
        assert_eq!(cell.get(), 2.0);
    }

    #[test]
    fn passes_through_non_finite() {
        let cell = AtomicF64::new(f64::INFINITY);
        cell.add(1.0);
        assert_eq!(cell.get(), f64::INFINITY);
        cell.set(f64::NAN);
        assert!(cell.swap(0.0).is_nan());
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let cell = Arc::new(AtomicF64::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        cell.add(1.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cell.get(), 80_000.0);
    }
}
