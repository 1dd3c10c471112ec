pub mod deal_repository;
pub mod signal_repository;
