pub mod adjustment;
pub mod audit_log;
pub mod checkpoint;
pub mod participant;
pub mod race;
pub mod registration;
pub mod result_cache;
pub mod timing_event;
pub mod timing_session;
