//! Yes/no gate in front of deletes.

use crate::record::RecordId;

pub const DELETE_CONFIRM_TITLE: &str = "Confirm delete";
pub const DELETE_CONFIRM_MESSAGE: &str = "Are you sure you want to delete this record?";

/// Holds the id awaiting confirmation. Only [`DeleteConfirmation::confirm`] hands it out.
#[derive(Debug, Default)]
pub struct DeleteConfirmation {
    pending: Option<RecordId>,
}

impl DeleteConfirmation {
    pub fn request(&mut self, id: RecordId) {
        self.pending = Some(id);
    }

    pub fn pending(&self) -> Option<&RecordId> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn confirm(&mut self) -> Option<RecordId> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
