//! Shared application state
//!
//! Every handle the handlers need is injected through this one struct; nothing
//! in the crate reaches for a global. Cloning is cheap since the database
//! client and the arc'd services are reference-counted.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::config::Config;
use crate::db::repository::{CartRepository, OrderRepository, ProductRepository};

#[derive(Clone)]
pub struct AppState {
    db: Surreal<Db>,
    jwt: Arc<JwtService>,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Surreal<Db>, jwt: JwtService, config: Config) -> Self {
        Self {
            db,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.db.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }
}
