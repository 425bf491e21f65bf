//! Bank lookup by identifier.

use std::collections::HashMap;
use std::sync::Arc;

use payments_types::{Clock, DomainError, PaymentStore, normalize_bank_id};

use crate::bank::{BankProcessor, BankProfile, KNOWN_BANKS};

/// Maps normalized bank identifiers to their processors.
pub struct BankRegistry<R: PaymentStore> {
    processors: HashMap<String, Arc<BankProcessor<R>>>,
}

impl<R: PaymentStore> BankRegistry<R> {
    /// Registry over [`KNOWN_BANKS`].
    pub fn new(store: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self::with_profiles(KNOWN_BANKS.iter().cloned(), store, clock)
    }

    pub fn with_profiles(
        profiles: impl IntoIterator<Item = BankProfile>,
        store: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut processors = HashMap::new();
        for profile in profiles {
            let keys: Vec<String> = profile.keys().collect();
            let processor = Arc::new(BankProcessor::new(profile, store.clone(), clock.clone()));
            for key in keys {
                processors.insert(key, processor.clone());
            }
        }
        Self { processors }
    }

    /// Finds the processor for `bank_id`, ignoring case and surrounding
    /// whitespace.
    pub fn resolve(&self, bank_id: &str) -> Result<&BankProcessor<R>, DomainError> {
        self.processors
            .get(&normalize_bank_id(bank_id))
            .map(Arc::as_ref)
            .ok_or_else(|| DomainError::BankNotFound(bank_id.to_string()))
    }
}
