// Library exports for follow-seed
// The binaries and integration tests drive the seeder through these modules

pub mod avatar;
pub mod config;
pub mod db;
pub mod fixture;
pub mod logging;
pub mod seed;
pub mod verify;
