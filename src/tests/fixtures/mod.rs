// Shared test fixtures, compiled into the crate only under cfg(test).

pub mod app;
pub mod claims;
pub mod clock;
pub mod customers;
pub mod tickets;
