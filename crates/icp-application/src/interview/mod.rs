//! Live interview orchestration.

mod capabilities;
mod controller;
mod view;


pub use capabilities::Capabilities;
pub use controller::{EndOutcome, InterviewController, SubmitOutcome};
pub use view::{InterviewView, Preferences, SessionResult};
