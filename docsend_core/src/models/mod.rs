pub mod clients;
pub mod uploads;
