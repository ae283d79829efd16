#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the reactive decentralized congestion control library.
//! 反应式分布式拥塞控制库的根。

pub mod config;
pub mod error;

pub mod channel_load;
pub mod smoothing;
pub mod state;
pub mod state_machine;
pub mod window;

pub mod driver;
pub mod gate;

pub use channel_load::ChannelLoad;
pub use config::Config;
pub use error::{Error, Result};
pub use state::{State, StateKind};
pub use state_machine::{DccReader, Snapshot, StateMachine, Transition};
