//! Moves notebook cell identifiers from the legacy top-level `id` key into
//! `metadata.id`, backing up the original notebook first.

pub mod paths;
pub mod storage;
