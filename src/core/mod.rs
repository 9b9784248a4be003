//! Core types used throughout wmdecor.

pub mod types;
