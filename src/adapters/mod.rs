//! Infrastructure adapters. Implement ports.
//!
//! Training backend, spreadsheet files, console UI. Map errors to DomainError.

pub mod backend;
pub mod spreadsheet;
pub mod ui;
