// Domain layer - Dashboard state model and schema inputs
pub mod dashboard;
pub mod expression;
pub mod pivot;
pub mod schema;
pub mod time_grain;
