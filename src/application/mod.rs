// Application layer - URL state mapping and dashboard use cases
pub mod dashboard_store;
pub mod explore_repository;
pub mod filter_codec;
pub mod overview;
pub mod pivot_builder;
pub mod time_range;
pub mod url_state;
pub mod url_writer;
pub mod view_state;
