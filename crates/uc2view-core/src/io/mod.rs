pub mod capture;
pub mod synthetic;
pub mod wire;
