// Infrastructure layer - External dependencies and adapters
pub mod catalog_repository;
pub mod config;
pub mod runtime_repository;
pub mod search_params;
