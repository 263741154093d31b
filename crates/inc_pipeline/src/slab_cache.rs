//! crates/inc_pipeline/src/slab_cache.rs
//! Process-wide slab table cache. The table is validated once per load and
//! shared read-only; `invalidate` is the only way a new table is picked up.
//! No TTL.

use std::sync::Arc;

use inc_algo::SlabTable;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::source::SlabSource;
use crate::EngineError;

#[derive(Default)]
struct CacheState {
    /// Bumped on every successful load.
    generation: u64,
    table: Option<Arc<SlabTable>>,
}

#[derive(Default)]
pub struct SlabCache {
    state: RwLock<CacheState>,
}

impl SlabCache {
    pub fn new() -> Self {
        SlabCache::default()
    }

    /// Current table and its generation, loading from `src` when empty.
    pub fn get_or_load<S: SlabSource + ?Sized>(&self, src: &S) -> Result<(Arc<SlabTable>, u64), EngineError> {
        {
            let st = self.state.read();
            if let Some(t) = &st.table {
                return Ok((Arc::clone(t), st.generation));
            }
        }

        let mut st = self.state.write();
        // Another caller may have loaded while we waited for the write lock.
        if let Some(t) = &st.table {
            return Ok((Arc::clone(t), st.generation));
        }
        let table = Arc::new(SlabTable::new(src.fetch_slabs()?)?);
        st.generation += 1;
        st.table = Some(Arc::clone(&table));
        debug!(generation = st.generation, slabs = table.len(), "slab table loaded");
        Ok((table, st.generation))
    }

    /// Drop the cached table; the next calculation reloads it.
    pub fn invalidate(&self) {
        let mut st = self.state.write();
        st.table = None;
        info!(generation = st.generation, "slab cache invalidated");
    }

    /// Generation of the most recent load (0 before the first).
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }
}

impl core::fmt::Debug for SlabCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let st = self.state.read();
        f.debug_struct("SlabCache")
            .field("generation", &st.generation)
            .field("loaded", &st.table.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use inc_core::entities::SlabDefinition;
    use inc_core::money::Money;
    use inc_core::variables::EngineConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        fetches: AtomicUsize,
        slabs: Vec<SlabDefinition>,
    }

    impl SlabSource for Counting {
        fn fetch_slabs(&self) -> Result<Vec<SlabDefinition>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.slabs.clone())
        }
        fn fetch_config(&self) -> Result<EngineConfig, SourceError> {
            Ok(EngineConfig::default())
        }
    }

    fn one_band() -> Vec<SlabDefinition> {
        vec![SlabDefinition {
            min_price: Money::new(0),
            max_price: None,
            incentive_per_unit: Money::new(100),
            gate_units: 0,
            volume_kicker_units: 0,
        }]
    }

    #[test]
    fn loads_once_until_invalidated() {
        let src = Counting { fetches: AtomicUsize::new(0), slabs: one_band() };
        let cache = SlabCache::new();
        assert_eq!(cache.generation(), 0);

        let (a, g1) = cache.get_or_load(&src).unwrap();
        let (b, g2) = cache.get_or_load(&src).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!((g1, g2), (1, 1));
        assert_eq!(src.fetches.load(Ordering::SeqCst), 1);

        cache.invalidate();
        let (_, g3) = cache.get_or_load(&src).unwrap();
        assert_eq!(g3, 2);
        assert_eq!(src.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalid_table_is_not_cached() {
        let src = Counting { fetches: AtomicUsize::new(0), slabs: Vec::new() };
        let cache = SlabCache::new();
        assert!(matches!(cache.get_or_load(&src), Err(EngineError::Configuration(_))));
        assert!(cache.get_or_load(&src).is_err());
        assert_eq!(src.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(cache.generation(), 0);
    }
}
