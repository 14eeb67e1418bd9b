//! Round schedulers.
//!
//! Drivers own the node array for the duration of one run, ask the topology
//! for contacts, apply message loss, deliver messages (immediately or through
//! the delay [`Mailbox`]) and record per-round statistics until the protocol's
//! termination predicate holds.

pub mod types;
pub mod loss;
pub mod epidemic;
pub mod mailbox;
pub mod delayed;
pub mod averaging;

pub use types::{
    AveragingMode, AveragingOutcome, AveragingParams, AveragingRound, DisseminationOutcome, GossipMode,
    RoundRecord, SiParams, SimulationError, SirParams,
};
pub use epidemic::{run_si, run_sir, si_rounds, sir_rounds, EpidemicRun};
pub use mailbox::{Mailbox, MAX_DELAY, MIN_DELAY};
pub use delayed::{run_si_async, si_async_rounds, DelayedSiRun};
pub use averaging::{run_averaging, AveragingRun};
