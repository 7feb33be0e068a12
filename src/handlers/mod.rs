//! Route handlers.

pub mod pages;
pub mod schedule;
