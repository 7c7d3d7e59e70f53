//! # Overview
//! "Procsim" provides a process-interaction discrete event simulation
//! kernel, to facilitate Rust- and npm-based simulation products and
//! projects.  Entities ("actors") move through a model built from
//! queueing and servicing components, under a single logical clock.
//!
//! This repository contains:
//!
//! * Random variable framework, for easy definition of stochastic
//! service, travel and inter-arrival times.
//! * Pre-built components (resources, wait queues, gates, junctions,
//! sources, sinks, transports and routes), for quickly building out
//! queueing models.
//! * Output analysis framework, for sample and time-persistent statistics.
//! * Simulator engine, the `Director`, for scheduling actors and executing
//! simulations, plus YAML/JSON model configuration and a WASM interface.
//!
//! Actor bodies are resumable state machines implementing `Script`; each
//! activation returns the next `Action` (hold, utilize a resource, pass a
//! gate, move, leave) for the `Director` to carry out.
//!
//! Procsim is compatible with a wide variety of compilation targets,
//! including WASM.  Procsim does not require nightly Rust.
pub mod input_modeling;
pub mod models;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
