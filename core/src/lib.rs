//! duty-core: on-call rotation resolution for a three-person team.
//!
//! A fixed six-week schedule decides the week's primary and secondary,
//! weekend rules narrow that to what each date shows, and operator-entered
//! substitutions override individual (date, slot) pairs.

pub mod calendar;
pub mod clock;
pub mod command;
pub mod config;
pub mod employee;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod rotation;
pub mod store;
pub mod substitution;
pub mod types;
pub mod weekend;
