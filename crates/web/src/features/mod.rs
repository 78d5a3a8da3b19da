pub mod adjustments;
pub mod analytics;
pub mod audit;
pub mod categories;
pub mod participants;
pub mod races;
pub mod results;
pub mod sessions;
pub mod timing;
