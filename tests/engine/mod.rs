//! End-to-end tests for the analysis engine.

mod config;
mod determinism;
mod extraction;
mod partitions;
mod scanner;
mod scenarios;
mod scoring;
