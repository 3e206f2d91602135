//! training-scheduler: eligibility matching and spreadsheet batch pipeline for a
//! workforce-training backend, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
