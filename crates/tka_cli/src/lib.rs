//! # tka_cli - Headless planning driver
//!
//! Loads the bone models, replays a scripted session of user intents and
//! reports the resulting landmarks and scene.

pub mod session;

pub use session::{replay, ReplayReport, Session, SessionError, SessionOutput, Step, StepFailure};
