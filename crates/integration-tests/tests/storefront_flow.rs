//! End-to-end shopper flows over HTTP.

#![allow(clippy::unwrap_used)]

use fofurices_integration_tests::{SheetServer, TestContext};

// =============================================================================
// Browsing
// =============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let ctx = TestContext::new().await;

    assert_eq!(ctx.get("/health").await, (200, "ok".to_string()));
    assert_eq!(ctx.get("/health/ready").await.0, 200);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .get(ctx.url("/health"))
        .header("x-request-id", "it-123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "it-123");
}

#[tokio::test]
async fn test_browse_catalog_and_filter() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/").await;
    assert_eq!(status, 200);
    assert!(body.contains("🧸 Pelúcias"));
    assert!(body.contains("🔑 Chaveiros"));
    assert!(body.contains("Urso de Pelúcia"));
    assert!(body.contains("Chaveiro Gato"));

    let (_, body) = ctx.get("/?category=pel").await;
    assert!(body.contains("Coelho"));
    assert!(!body.contains("Chaveiro Gato"));
}

#[tokio::test]
async fn test_product_detail_and_not_found() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/products/1").await;
    assert_eq!(status, 200);
    assert!(body.contains("R$ 10,50"));
    assert!(body.contains("drive.google.com/thumbnail?id=abc123"));

    let (status, body) = ctx.get("/products/404").await;
    assert_eq!(status, 404);
    assert!(body.contains("Produto não encontrado"));
}

#[tokio::test]
async fn test_static_stylesheet_is_served() {
    let ctx = TestContext::new().await;
    assert_eq!(ctx.get("/static/css/main.css").await.0, 200);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_add_twice_then_adjust_quantity() {
    let ctx = TestContext::new().await;

    ctx.post("/cart/add", &[("id", "1")]).await;
    let (status, body) = ctx.post("/cart/add", &[("id", "1")]).await;
    assert_eq!(status, 200);
    assert!(body.contains("TOTAL: R$ 21,00"));

    ctx.post("/cart/add", &[("id", "2")]).await;
    let (_, body) = ctx.get("/cart").await;
    assert!(body.contains("TOTAL: R$ 46,00"));
    assert!(body.contains("3 itens"));

    let (_, body) = ctx.post("/cart/update", &[("id", "1"), ("quantity", "-3")]).await;
    assert!(body.contains("TOTAL: R$ 25,00"));

    let (_, body) = ctx.post("/cart/remove", &[("id", "2")]).await;
    assert!(body.contains("Carrinho vazio"));
}

#[tokio::test]
async fn test_add_redirects_back_to_catalog() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post("/cart/add", &[("id", "2"), ("return_to", "/?category=pel")])
        .await;

    assert_eq!(status, 200);
    assert!(body.contains("Carrinho (1 item)"));
    assert!(body.contains("Coelho"));
}

#[tokio::test]
async fn test_add_unknown_product() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.post("/cart/add", &[("id", "999")]).await;
    assert_eq!(status, 404);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_favorite_toggle_is_idempotent_in_pairs() {
    let ctx = TestContext::new().await;

    let (_, body) = ctx.post("/favorites/toggle", &[("id", "2")]).await;
    assert!(body.contains("&#10084;") || body.contains("❤"));

    let (_, body) = ctx.get("/favorites").await;
    assert!(body.contains("Coelho"));

    ctx.post("/favorites/toggle", &[("id", "2")]).await;
    let (_, body) = ctx.get("/favorites").await;
    assert!(body.contains("Nenhum favorito ainda."));
}

// =============================================================================
// Catalog lifecycle
// =============================================================================

#[tokio::test]
async fn test_new_product_is_found_after_refresh() {
    let ctx = TestContext::new().await;
    ctx.sheet.set_products(
        "id,categoria_id,nome,preco\n1,pel,Urso de Pelúcia,\"10,50\"\n4,pel,Panda,\"30,00\"\n",
    );

    let (status, body) = ctx.get("/products/4").await;

    assert_eq!(status, 200);
    assert!(body.contains("Panda"));
}

#[tokio::test]
async fn test_restart_keeps_cart_and_serves_cached_catalog() {
    let ctx = TestContext::new().await;
    ctx.post("/cart/add", &[("id", "1")]).await;
    ctx.post("/favorites/toggle", &[("id", "3")]).await;

    ctx.sheet.set_failing(true);
    let restarted = TestContext::with(ctx.sheet.clone(), ctx.data_dir.clone()).await;

    let (_, body) = restarted.get("/").await;
    assert!(body.contains("Urso de Pelúcia"));

    let (_, body) = restarted.get("/cart").await;
    assert!(body.contains("TOTAL: R$ 10,50"));

    let (_, body) = restarted.get("/favorites").await;
    assert!(body.contains("Chaveiro Gato"));
}

#[tokio::test]
async fn test_cold_start_without_sources_serves_empty_catalog() {
    let sheet = SheetServer::start().await;
    sheet.set_failing(true);
    let data_dir = std::env::temp_dir().join(format!("fofurices-it-{}", uuid::Uuid::new_v4()));

    let ctx = TestContext::with(sheet, data_dir).await;

    assert_eq!(ctx.get("/health/ready").await.0, 200);
    let (status, body) = ctx.get("/").await;
    assert_eq!(status, 200);
    assert!(body.contains("Nenhum produto encontrado."));
}
