#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod graphql;
pub mod mock;
pub mod rest;

use crate::configuration::Config;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    /// Picks the one backend this process talks to. Mock mode is decided here
    /// and never per request.
    pub fn get(config: &Config) -> BackendBox {
        match config.resolved_backend() {
            BackendName::GraphQL => {
                return Box::new(graphql::GraphQL::new(&config.graphql_url));
            }
            BackendName::Rest => {
                return Box::new(rest::Rest::new(&config.rest_url, &config.rest_token));
            }
            BackendName::Mock => {
                return Box::<mock::Mock>::default();
            }
        }
    }
}
