//! Versioned, atomically swappable configuration snapshots.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::config::{Validate, ValidationError};

/// One immutable version of a configuration group.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Starts at 1 and increases by one on every accepted update.
    pub version: u64,
    pub value: T,
}

/// Holder for a single configuration group.
///
/// Readers take one snapshot per use with [`ConfigCell::get`] and never block.
/// Writers are serialized by an internal mutex so that validation and the swap
/// happen as one step; the last accepted update wins.
#[derive(Debug)]
pub struct ConfigCell<T> {
    current: ArcSwap<Snapshot<T>>,
    writer: Mutex<()>,
}

impl<T: Validate> ConfigCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot {
                version: 1,
                value: initial,
            }),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot.
    pub fn get(&self) -> Arc<Snapshot<T>> {
        self.current.load_full()
    }

    /// Validate `next` and, if it holds, publish it as the new snapshot.
    ///
    /// On error the previous snapshot stays in effect.
    pub fn update(&self, next: T) -> Result<Arc<Snapshot<T>>, ValidationError> {
        next.validate()?;

        let _guard = self.writer.lock().expect("config cell writer mutex poisoned");
        let version = self.current.load().version + 1;
        let snapshot = Arc::new(Snapshot {
            version,
            value: next,
        });
        self.current.store(snapshot.clone());
        Ok(snapshot)
    }
}
