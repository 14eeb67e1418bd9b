//! # Gossipsim - Round-based simulator for gossip and epidemic protocols
//!
//! This library runs gossip protocols over synthetic network topologies and
//! records how fast information spreads and how many messages it costs.
//!
//! ## Overview
//!
//! A run pairs one [`topology`] with one protocol. Every round the scheduler
//! asks the topology for each node's contact, lets every node emit its
//! messages, drops messages according to the loss model, delivers the rest
//! (immediately or after a random delay) and records per-round statistics
//! until the protocol's termination predicate holds.
//!
//! ## Key Features
//!
//! - **Dissemination**: SI push, pull and push-pull, plus SIR rumor mongering
//!   with probabilistic loss of interest
//! - **Averaging**: Push-Sum and the loss-tolerant Push-Flow
//! - **Topologies**: complete graph, ring, connected random geometric graph
//! - **Scheduling**: fixed (replayable) or adaptive contact selection
//! - **Delivery**: synchronous rounds or delayed asynchronous delivery
//! - **Reproducible**: every random decision comes from an injected `RngCore`
//!
//! ## Architecture
//!
//! - `topology`: contact sampling over the supported graph shapes
//! - `message`: messages exchanged between nodes
//! - `node`: per-protocol node state machines
//! - `simulation`: round schedulers, loss model and delay mailbox
//! - `config`: experiment configuration structures and validation
//! - `config_loader`: YAML loading
//! - `orchestrator`: turns a configuration into a finished run
//! - `report`: text and JSON run summaries
//!
//! ## Example Usage
//!
//! ```rust
//! use gossipsim::simulation::{run_si, SiParams};
//! use gossipsim::topology::{CompleteGraph, SchedulingMode};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut graph = CompleteGraph::new(50, SchedulingMode::Adaptive, &mut rng)?;
//! let outcome = run_si(&mut graph, &SiParams::default(), &mut rng)?;
//!
//! assert_eq!(outcome.last().unwrap().infected, 50);
//! println!("{} rounds, {} messages", outcome.rounds(), outcome.total_messages());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   seed: 42
//!   log_level: info
//!
//! topology:
//!   kind: geometric      # complete/ring/geometric
//!   nodes: 200
//!   radius: 0.3
//!   scheduling: fixed    # fixed/adaptive
//!
//! experiment:
//!   protocol: sir        # si/si_async/sir/averaging
//!   mode: push_pull      # push/pull/push_pull
//!   k: 2.0
//!   loss_probability: 0.1
//! ```
//!
//! ## Error Handling
//!
//! Library operations return typed errors ([`topology::TopologyError`],
//! [`simulation::SimulationError`], [`config::ValidationError`]); the binary
//! and the orchestrator report them through `color_eyre`. Out-of-range node
//! indices are programming errors and panic.

pub mod topology;
pub mod message;
pub mod node;
pub mod simulation;
pub mod config;
pub mod config_loader;
pub mod orchestrator;
pub mod report;
