#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;

use config::StoreFairing;
use logging::LoggerFairing;
use store::Store;

/// Build the production server: the padrón is loaded from the path named in
/// the Rocket config.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/api", api::routes())
        .attach(StoreFairing)
        .attach(LoggerFairing)
}

/// Build a server around an existing store, skipping the seed-file fairing.
/// This is the entry point tests use.
pub fn build_with_store(store: Store) -> Rocket<Build> {
    rocket::build()
        .mount("/api", api::routes())
        .manage(store)
        .attach(LoggerFairing)
}
