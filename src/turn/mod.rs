//! Turn handling: channels, per-turn state, event folding and the
//! controller that drives a turn from request to terminal status.

mod aggregator;
mod channel;
mod controller;
mod state;

pub use aggregator::{apply, Applied};
pub use channel::Channel;
pub use controller::{ControllerPhase, TurnController, TurnHandle, TurnSnapshot};
pub use state::{
    TurnState, TurnStatus, INTERRUPTED_NOTICE, NO_CONTENT_MARKER, STREAM_ENDED_MARKER,
};
