pub mod client;
pub mod locker;
pub mod payment;
pub mod rental;
pub mod user;
