//! Beat-list I/O
//!
//! Reading and writing beat time sequences as plain text.

pub mod beat_list;
