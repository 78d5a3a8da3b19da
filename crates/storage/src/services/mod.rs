pub mod adjustments;
pub mod analytics;
pub mod audit;
pub mod categories;
pub mod events;
pub mod results;
pub mod roster;
pub mod sessions;
pub mod timing;
