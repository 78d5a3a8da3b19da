mod audit_log;
mod checkpoint;
mod participant;
mod race;
mod registration;
mod result_adjustment;
mod result_cache;
mod timing_event;
mod timing_session;

pub use audit_log::{AuditAction, AuditLogEntry};
pub use checkpoint::Checkpoint;
pub use participant::Participant;
pub use race::Race;
pub use registration::Registration;
pub use result_adjustment::ResultAdjustment;
pub use result_cache::ResultCacheEntry;
pub use timing_event::TimingEvent;
pub use timing_session::TimingSession;
