pub mod audit;
pub mod extensions;
pub mod files;
pub mod health;
pub mod upload;
