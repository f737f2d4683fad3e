//! Core of the syscall stub generator.
//!
//! A syscall table is a plain text file with one `DEF_SYSCALL` declaration
//! per line. [`table`] parses and validates it into [`table::SyscallRecord`]s,
//! [`emit`] renders the generated artifacts (number defines, C prototypes,
//! assembly trampolines) from them. Neither module does any file I/O; the
//! `stubgen` binary owns paths, exit codes and the filesystem.

pub mod emit;
pub mod table;

pub use table::{parse_line, parse_table, ParseError, SyscallRecord, TableError};
