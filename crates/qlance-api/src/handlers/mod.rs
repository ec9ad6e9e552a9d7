pub mod contract;
pub mod health;
pub mod jobs;
pub mod on_chain;
pub mod wallet;
