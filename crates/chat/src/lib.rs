//! Turn driver: wires a provider event stream through the aggregator, the
//! throttled renderer, and the upserter, then records the finished turn.

pub mod error;
pub mod turn;

pub use {
    error::{Error, Result},
    turn::{TurnConfig, TurnOutcome, TurnStore, run_turn},
};
