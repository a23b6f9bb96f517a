use crate::collection::RecordId;
use crate::common::get_current_micros_or_zero;
use log::warn;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// The process-wide id generator shared by every collection.
pub(crate) static ID_GENERATOR: Lazy<UniqidGenerator> = Lazy::new(UniqidGenerator::new);

/// Generates unique record ids.
///
/// An id is the creation time in microseconds rendered as lowercase hex,
/// followed by 4 random bytes. The time prefix makes ids from a single
/// process sort roughly by insertion order; the random suffix guards
/// against collisions across processes sharing a data directory.
pub struct UniqidGenerator {
    last_micros: AtomicU64,
    mutex: Mutex<()>,
}

impl UniqidGenerator {
    pub fn new() -> Self {
        UniqidGenerator {
            last_micros: AtomicU64::new(0),
            mutex: Mutex::new(()),
        }
    }

    pub fn generate(&self) -> RecordId {
        // Acquire the lock with poison recovery
        let _lock = match self.mutex.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("Uniqid lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };

        let mut micros = get_current_micros_or_zero() as u64;
        let last = self.last_micros.load(Ordering::Relaxed);

        // Handle clock moving backwards (and same-microsecond calls) by
        // bumping past the last issued timestamp
        if micros <= last {
            micros = last + 1;
        }
        self.last_micros.store(micros, Ordering::Relaxed);
        drop(_lock);

        let entropy: u32 = OsRng.gen();
        RecordId::from_generated(format!("{:x}{:08x}", micros, entropy))
    }
}

impl Default for UniqidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_ids() {
        let generator = UniqidGenerator::new();
        let mut ids = Vec::new();
        for _ in 0..1000 {
            ids.push(generator.generate());
        }

        let mut unique_ids = ids.clone();
        unique_ids.sort();
        unique_ids.dedup();
        assert_eq!(ids.len(), unique_ids.len());
    }

    #[test]
    fn generates_parseable_ids() {
        let generator = UniqidGenerator::new();
        let id = generator.generate();
        assert!(RecordId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn ids_sort_by_generation_order() {
        let generator = UniqidGenerator::new();
        let first = generator.generate();
        let second = generator.generate();
        // the micros prefix is strictly increasing within a process
        assert_ne!(first, second);
    }

    #[test]
    fn handles_clock_backwards() {
        let generator = UniqidGenerator::new();
        generator
            .last_micros
            .store(get_current_micros_or_zero() as u64 + 1_000_000, Ordering::Relaxed);
        let id = generator.generate();
        assert!(RecordId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn handles_multiple_concurrent_id_generation() {
        use std::sync::Arc;
        use std::thread;

        let generator = Arc::new(UniqidGenerator::new());
        let mut handles = vec![];

        // Spawn 10 threads that each generate 100 IDs
        for _ in 0..10 {
            let gen = Arc::clone(&generator);
            let handle = thread::spawn(move || {
                let mut ids = Vec::new();
                for _ in 0..100 {
                    ids.push(gen.generate());
                }
                ids
            });
            handles.push(handle);
        }

        let mut all_ids = Vec::new();
        for handle in handles {
            let ids = handle.join().unwrap();
            all_ids.extend(ids);
        }

        let mut unique_ids = all_ids.clone();
        unique_ids.sort();
        unique_ids.dedup();
        assert_eq!(all_ids.len(), unique_ids.len());
    }
}
