// This module builds the engine's intrinsic registry: an immutable name-to-address table
// of runtime-provided native functions callable from generated code. The table is
// populated exactly once at engine construction from an externally supplied, owned list
// of NativeSymbol records plus the synthetic parallel dispatch entry. Duplicate names in
// the provider list, or a collision with the synthetic entry, fail construction. The
// table backs has_symbol, which distinguishes guaranteed, statically known runtime
// intrinsics from addresses that merely happen to resolve.

//! The intrinsic symbol registry.

use std::collections::HashMap;

use crate::error::{JitError, JitResult};
use crate::runtime::{texjit_parallel_for, PARALLEL_DISPATCH_SYMBOL};

/// One (name, address) record handed across the engine construction boundary.
///
/// Providers build an owned `Vec<NativeSymbol>` and transfer it to the engine;
/// their storage for the list is released once the table has copied it.
#[derive(Debug, Clone)]
pub struct NativeSymbol {
    name: String,
    address: usize,
}

impl NativeSymbol {
    pub fn new(name: impl Into<String>, address: usize) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> usize {
        self.address
    }
}

/// Immutable name → address table of runtime intrinsics.
///
/// Populated once at engine construction; never mutated afterward, which is
/// what makes unsynchronized concurrent reads safe.
#[derive(Debug)]
pub struct IntrinsicTable {
    entries: HashMap<String, usize>,
}

impl IntrinsicTable {
    /// Build the table from a provider list, consuming it.
    ///
    /// The synthetic parallel dispatch entry is always added, independent of
    /// the list. Registering a name twice is a fatal duplicate-definition
    /// error: the engine cannot be constructed from an ambiguous table.
    pub fn build(provided: Vec<NativeSymbol>) -> JitResult<Self> {
        let mut entries = HashMap::with_capacity(provided.len() + 1);
        for symbol in provided {
            if entries.insert(symbol.name.clone(), symbol.address).is_some() {
                return Err(JitError::DuplicateIntrinsic { name: symbol.name });
            }
        }
        if entries
            .insert(
                PARALLEL_DISPATCH_SYMBOL.to_string(),
                texjit_parallel_for as usize,
            )
            .is_some()
        {
            return Err(JitError::DuplicateIntrinsic {
                name: PARALLEL_DISPATCH_SYMBOL.to_string(),
            });
        }
        log::debug!("registered {} intrinsic symbols", entries.len());
        Ok(Self { entries })
    }

    /// Whether `name` is a registered intrinsic.
    ///
    /// Answers only for entries in this table, never for process or
    /// module-local symbols.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn address_of(&self, name: &str) -> Option<usize> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn stub_a() {}
    extern "C" fn stub_b() {}

    #[test]
    fn synthetic_dispatch_entry_is_always_present() {
        let table = IntrinsicTable::build(Vec::new()).unwrap();
        assert!(table.contains(PARALLEL_DISPATCH_SYMBOL));
        assert_eq!(
            table.address_of(PARALLEL_DISPATCH_SYMBOL),
            Some(texjit_parallel_for as usize)
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn provider_entries_are_copied_into_the_table() {
        let provided = vec![
            NativeSymbol::new("stub_a", stub_a as usize),
            NativeSymbol::new("stub_b", stub_b as usize),
        ];
        let table = IntrinsicTable::build(provided).unwrap();
        assert!(table.contains("stub_a"));
        assert_eq!(table.address_of("stub_b"), Some(stub_b as usize));
        assert!(!table.contains("stub_c"));
    }

    #[test]
    fn duplicate_provider_names_fail_construction() {
        let provided = vec![
            NativeSymbol::new("stub_a", stub_a as usize),
            NativeSymbol::new("stub_a", stub_b as usize),
        ];
        let err = IntrinsicTable::build(provided).unwrap_err();
        assert!(matches!(
            err,
            JitError::DuplicateIntrinsic { name } if name == "stub_a"
        ));
    }

    #[test]
    fn provider_collision_with_dispatch_symbol_fails_construction() {
        let provided = vec![NativeSymbol::new(PARALLEL_DISPATCH_SYMBOL, stub_a as usize)];
        let err = IntrinsicTable::build(provided).unwrap_err();
        assert!(matches!(err, JitError::DuplicateIntrinsic { .. }));
    }
}
