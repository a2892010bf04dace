//! Audit logging for purge runs.

pub mod jsonl;
