use rocket::{
    fairing::{Fairing, Info, Kind},
    tokio::fs,
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::Padron;
use crate::store::Store;

/// Where the seed data lives. Derived from `Rocket.toml` and `ROCKET_*`
/// environment variables.
#[derive(Deserialize)]
struct StoreConfig {
    padron_path: String,
}

/// A fairing that loads the padrón seed file, validates it, builds the
/// in-memory store, and places it into managed state.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Padrón",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Read and validate the seed file.
        let contenido = match fs::read_to_string(&config.padron_path).await {
            Ok(contenido) => contenido,
            Err(e) => {
                error!("Failed to read padrón file {:?}: {e}", config.padron_path);
                return Err(rocket);
            }
        };
        let padron: Padron = match serde_json::from_str(&contenido) {
            Ok(padron) => padron,
            Err(e) => {
                error!("Failed to parse padrón file {:?}: {e}", config.padron_path);
                return Err(rocket);
            }
        };
        if let Err(e) = padron.validar() {
            error!("Padrón inconsistente: {e}");
            return Err(rocket);
        }
        info!(
            "Padrón cargado: {} circuitos, {} habilitados, {} partidos",
            padron.circuitos.len(),
            padron.habilitados.len(),
            padron.partidos.len()
        );

        // Manage the state.
        Ok(rocket.manage(Store::from_padron(padron)))
    }
}
