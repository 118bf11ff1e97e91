//! Integration tests for the Fofurices storefront.
//!
//! Each test gets its own fake spreadsheet server and its own storefront,
//! both bound to `127.0.0.1:0`, plus a fresh data directory. Nothing outside
//! the machine is contacted.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fofurices-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, http::StatusCode, routing::get};
use fofurices_storefront::cache::{CacheStore, FileStorage};
use fofurices_storefront::config::{CatalogConfig, StorefrontConfig};
use fofurices_storefront::state::AppState;
use fofurices_storefront::{app, startup};
use url::Url;

pub const PRODUCTS_CSV: &str = "id,categoria_id,nome,descricao,preco,imagem_url,disponivel\n\
    1,pel,Urso de Pelúcia,\"Macio, marrom\",\"10,50\",https://drive.google.com/file/d/abc123/view,sim\n\
    2,pel,Coelho,Branco,\"25,00\",,sim\n\
    3,cha,Chaveiro Gato,Metal,\"5,00\",,não\n";

pub const CATEGORIES_CSV: &str = "id,nome,icone\npel,Pelúcias,🧸\ncha,Chaveiros,🔑\n";

/// A fake published spreadsheet whose contents tests can change.
#[derive(Clone)]
pub struct SheetServer {
    pub addr: SocketAddr,
    sheets: Arc<RwLock<Sheets>>,
}

struct Sheets {
    products: String,
    categories: String,
    failing: bool,
}

impl SheetServer {
    pub async fn start() -> Self {
        let sheets = Arc::new(RwLock::new(Sheets {
            products: PRODUCTS_CSV.to_string(),
            categories: CATEGORIES_CSV.to_string(),
            failing: false,
        }));

        let router = Router::new()
            .route("/products.csv", get(products))
            .route("/categories.csv", get(categories))
            .with_state(sheets.clone());

        Self {
            addr: serve(router).await,
            sheets,
        }
    }

    pub fn set_products(&self, csv: &str) {
        self.sheets.write().unwrap().products = csv.to_string();
    }

    /// Make every export answer 500.
    pub fn set_failing(&self, failing: bool) {
        self.sheets.write().unwrap().failing = failing;
    }

    #[must_use]
    pub fn catalog_config(&self) -> CatalogConfig {
        let mut config = CatalogConfig::new(
            Url::parse(&format!("http://{}/products.csv", self.addr)).unwrap(),
            Url::parse(&format!("http://{}/categories.csv", self.addr)).unwrap(),
        );
        config.min_load_delay = std::time::Duration::ZERO;
        config.startup_wait = std::time::Duration::from_secs(5);
        config
    }
}

async fn products(State(sheets): State<Arc<RwLock<Sheets>>>) -> (StatusCode, String) {
    let sheets = sheets.read().unwrap();
    if sheets.failing {
        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
    } else {
        (StatusCode::OK, sheets.products.clone())
    }
}

async fn categories(State(sheets): State<Arc<RwLock<Sheets>>>) -> (StatusCode, String) {
    let sheets = sheets.read().unwrap();
    if sheets.failing {
        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
    } else {
        (StatusCode::OK, sheets.categories.clone())
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A running storefront plus an HTTP client pointed at it.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub state: AppState,
    pub sheet: SheetServer,
    pub data_dir: PathBuf,
}

impl TestContext {
    /// Start a sheet server and a storefront over a fresh data directory.
    pub async fn new() -> Self {
        let sheet = SheetServer::start().await;
        let data_dir = std::env::temp_dir().join(format!("fofurices-it-{}", uuid::Uuid::new_v4()));
        Self::with(sheet, data_dir).await
    }

    /// Start a storefront against an existing sheet and data directory, as
    /// after a restart.
    pub async fn with(sheet: SheetServer, data_dir: PathBuf) -> Self {
        let mut config = StorefrontConfig::new(sheet.catalog_config());
        config.cache.data_dir.clone_from(&data_dir);

        let cache = CacheStore::new(
            FileStorage::open(data_dir.clone()).unwrap(),
            config.cache.key_prefix.clone(),
        );
        let state = AppState::new(config, cache).unwrap();
        startup::load_catalog(&state).await;

        let addr = serve(app(state.clone())).await;

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            state,
            sheet,
            data_dir,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a page, returning status and body.
    pub async fn get(&self, path: &str) -> (u16, String) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    /// POST a form and follow the redirect, returning the final status and body.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> (u16, String) {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }
}
