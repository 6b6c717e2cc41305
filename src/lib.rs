//! clientdesk: a small client/project dashboard service.
//!
//! A REST API over a durable record store for two entities, clients and
//! projects, plus an aggregation engine that derives dashboard totals,
//! time-filtered stats, and monthly earnings from the stored records.
//! Persistence is an embedded libSQL file by default, with an in-memory
//! backend behind the same trait for tests and throwaway runs.

pub mod config;
pub mod db;
pub mod error;
pub mod stats;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;
