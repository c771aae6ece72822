// Domain layer - Pure types and consumption normalization
pub mod account;
pub mod consumption;
pub mod reading;
pub mod sensor;
