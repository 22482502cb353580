//! Schema registry: derive once per type, reuse everywhere.
//!
//! Deriving a schema walks the type's column declaration and validates it,
//! so the result is memoized per `(type, kind)` pair. The registry is an
//! explicit object rather than hidden module state: the plain load/dump
//! entry points go through [`global()`], and the `_with` variants accept a
//! caller-owned registry so tests can reset between cases.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;

use crate::error::SchemaError;
use crate::schema::{ColumnTable, Field, RowRecord, Schema, SchemaKind};

type Cache = HashMap<(TypeId, SchemaKind), Arc<Schema>>;

/// Memoizes derived schemas per record type.
///
/// Entries are write-once-then-immutable, so concurrent readers need no
/// coordination. Threads racing to derive the same schema for the first
/// time may compute it redundantly; the results are identical and the
/// first insert wins.
pub struct SchemaRegistry {
    cache: RwLock<Cache>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self { cache: RwLock::new(HashMap::new()) }
    }

    /// Resolve the row-style schema for `T`, deriving it on first use.
    pub fn rows<T: RowRecord>(&self) -> Result<Arc<Schema>, SchemaError> {
        self.resolve::<T>(SchemaKind::Rows, T::columns)
    }

    /// Resolve the column-style schema for `T`, deriving it on first use.
    pub fn columns<T: ColumnTable>(&self) -> Result<Arc<Schema>, SchemaError> {
        self.resolve::<T>(SchemaKind::Columns, T::columns)
    }

    fn resolve<T: 'static>(
        &self,
        kind: SchemaKind,
        describe: fn() -> Vec<Field>,
    ) -> Result<Arc<Schema>, SchemaError> {
        let key = (TypeId::of::<T>(), kind);
        if let Some(schema) = self.read().get(&key) {
            return Ok(Arc::clone(schema));
        }

        // Derive outside the lock; a racing thread inserting first keeps
        // its entry.
        let schema = Arc::new(Schema::derive(kind, describe())?);
        tracing::debug!(ty = std::any::type_name::<T>(), "derived schema");
        Ok(Arc::clone(self.write().entry(key).or_insert(schema)))
    }

    /// Drop every cached schema.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Cache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// The process-wide registry backing the plain load/dump entry points.
pub fn global() -> &'static SchemaRegistry {
    &GLOBAL
}
