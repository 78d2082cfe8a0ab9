//! Vigil dispatch pipeline: condition evaluation, message delivery, and the
//! periodic sweep that drives both.
//!
//! - [`evaluator`] — scans pending triggers and decides which have elapsed.
//! - [`orchestrator`] — claims the will, delivers its messages, finalizes
//!   the trigger.
//! - [`scheduler`] — the interval loop that runs sweeps until shutdown.
//! - [`delivery`] — the outbound transport seam (SMTP, or disabled).

pub mod delivery;
pub mod evaluator;
pub mod orchestrator;
pub mod scheduler;

pub use delivery::{Delivery, DeliveryError, DisabledDelivery, SmtpConfig, SmtpDelivery};
pub use orchestrator::{DispatchOrchestrator, SweepStats};
pub use scheduler::SweepScheduler;
