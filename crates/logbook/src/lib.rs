//! Logbook - local-first, multi-writer issue and session tracking.
//!
//! Every change is an event appended to a JSONL log owned by one writer.
//! Current state is never stored; it is reconstructed by merging every
//! writer's log in timestamp order and folding the events.
//!
//! - [`storage`] discovers, reads, merges and appends the logs
//! - [`reconstruct`] folds events into issues and collects sessions
//! - [`id_generation`] allocates namespace-scoped IDs
//! - [`graph`] answers readiness questions and levels the dependency graph
//! - [`output`] renders diagrams, reports and terminal text
//! - [`app`] ties these together behind validated operations

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod graph;
pub mod id_generation;
pub mod output;
pub mod query;
pub mod reconstruct;
pub mod storage;

// Public CLI module (needed by binary)
pub mod cli;

#[cfg(test)]
pub(crate) mod test_support;
