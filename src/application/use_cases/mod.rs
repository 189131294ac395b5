pub mod audit;
pub mod settings;
pub mod verification;
