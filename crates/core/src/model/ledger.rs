use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("ledger slot {index} is out of range (ledger has {len} slots)")]
    OutOfRange { index: usize, len: usize },
}

/// Fixed-length record of the option chosen for each question.
///
/// A plain data container: it has no notion of stages, so callers decide when
/// writes are allowed. Later writes to a slot overwrite earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLedger {
    slots: Vec<Option<String>>,
}

impl AnswerLedger {
    /// Creates a ledger with `len` unset slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the selected option, or `None` for an unset (or nonexistent) slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(Option::as_deref)
    }

    /// Records `option` for slot `index`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::OutOfRange` if `index` is not a slot.
    pub fn set(&mut self, index: usize, option: impl Into<String>) -> Result<(), LedgerError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(LedgerError::OutOfRange { index, len })?;
        *slot = Some(option.into());
        Ok(())
    }

    /// True iff no slot is unset.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.slots.iter().map(Option::as_deref)
    }
}
