//! Identity contract shared by every persisted record.

/// Identifier value of a record that has never been saved.
pub const UNASSIGNED_ID: i64 = 0;

/// A record with a store-assigned identifier.
///
/// `set_id` is meant for repositories only: they call it once, right after
/// the store hands out a new row id.
pub trait Entity<Id> {
    fn id(&self) -> Id;
    fn set_id(&mut self, id: Id);
}
