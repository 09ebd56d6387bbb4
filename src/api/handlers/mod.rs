pub mod accounts;
pub mod orders;
pub mod products;
pub mod system;
