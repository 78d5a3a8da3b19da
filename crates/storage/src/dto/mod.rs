pub mod adjustment;
pub mod analytics;
pub mod audit;
pub mod checkpoint;
pub mod participant;
pub mod race;
pub mod results;
pub mod session;
pub mod timing;
