//!  Storage is organized through [record_storage::JsonFileStorage].
//!  The basic idea is:
//!   - There is a single JSON record holding the profile and the ordered habit list.
//!   - The record is rewritten as a whole after every mutation of the tracker.
//!   - Entities in [entities] are the on-disk shape, kept separate from the tracker's types.

pub mod entities;
pub mod record_storage;
