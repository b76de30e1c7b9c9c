pub mod nrf24;

pub use nrf24::{Nrf24, Nrf24Error};
