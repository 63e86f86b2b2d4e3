//! Game services: scoring, round lifecycle, session coordination and the
//! channel control surface.

pub mod controls;
pub mod ledger;
pub mod round_lifecycle;
pub mod session;

pub use controls::{ControlCommand, GameBot, StartReport};
pub use ledger::{ScoreLedger, Standing};
pub use round_lifecycle::{ClosedRound, RoundEngine};
pub use session::{Advance, GameSession, SessionCoordinator, SessionParams, SessionProgress};
