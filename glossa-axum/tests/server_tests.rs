use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use glossa_axum::{CatalogServer, request_locale, translate_in_request};
use glossa_core::{DirSource, LocaleEngine, SupportedLocales, Vars};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const UK: &str = r#"{"nav":{"home":"Головна"},"greeting":"Привіт, {{name}}!","only_uk":"лише"}"#;
const EN: &str = r#"{"nav":{"home":"Home"},"greeting":"Hello, {{name}}!"}"#;

struct Fixture {
    _dir: TempDir,
    engine: Arc<LocaleEngine>,
    router: Router,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("uk.json"), UK).unwrap();
    std::fs::write(dir.path().join("en.json"), EN).unwrap();

    let supported = SupportedLocales::new(["uk", "en", "de"], "uk").unwrap();
    let engine = Arc::new(
        LocaleEngine::builder(supported)
            .source(DirSource::new(dir.path()))
            .build(),
    );
    engine.preload().await;

    let router = CatalogServer::new(Arc::clone(&engine), "127.0.0.1:0")
        .catalog_dir(dir.path())
        .mount(Router::new().route("/whoami", get(whoami)))
        .into_router();

    Fixture {
        _dir: dir,
        engine,
        router,
    }
}

async fn whoami() -> String {
    request_locale().unwrap_or_else(|| "not set".to_string())
}

async fn request_get(
    router: Router,
    uri: &str,
    accept_language: Option<&str>,
) -> (StatusCode, Option<String>, String) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(v) = accept_language {
        builder = builder.header("accept-language", v);
    }

    let response = router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_language = response
        .headers()
        .get("content-language")
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (
        status,
        content_language,
        String::from_utf8(body.to_vec()).unwrap(),
    )
}

#[tokio::test]
async fn serves_supported_catalogs() {
    let f = fixture().await;

    let (status, _, body) = request_get(f.router.clone(), "/locales/en.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, EN);

    let (status, _, body) = request_get(f.router.clone(), "/locales", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"default":"uk","supported":["uk","en","de"]}"#);
}

#[tokio::test]
async fn rejects_unknown_or_missing_catalogs() {
    let f = fixture().await;

    let (status, _, body) = request_get(f.router.clone(), "/locales/fr.json", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("unsupported locale: fr"));

    // supported but no file on disk
    let (status, _, body) = request_get(f.router.clone(), "/locales/de.json", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("catalog unavailable"));

    let (status, _, _) = request_get(f.router.clone(), "/locales/en.txt", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = request_get(f.router.clone(), "/locales/..%2Fsecret.json", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn translates_in_negotiated_locale() {
    let f = fixture().await;

    let (status, language, body) = request_get(
        f.router.clone(),
        "/t/greeting?name=Ann",
        Some("EN-US,en;q=0.9"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(language.as_deref(), Some("en"));
    assert_eq!(
        body,
        r#"{"locale":"en","key":"greeting","text":"Hello, Ann!"}"#
    );

    let (_, language, body) = request_get(f.router.clone(), "/t/nav.home", None).await;
    assert_eq!(language.as_deref(), Some("uk"));
    assert!(body.contains(r#""text":"Головна""#));

    // falls back to the default catalog, then to the key
    let (_, _, body) = request_get(f.router.clone(), "/t/only_uk", Some("en")).await;
    assert!(body.contains(r#""text":"лише""#));
    let (_, _, body) = request_get(f.router.clone(), "/t/no.such.key", Some("en")).await;
    assert!(body.contains(r#""text":"no.such.key""#));

    // requests never switch the engine's own locale
    assert_eq!(f.engine.current_locale(), "uk");
}

#[tokio::test]
async fn mounted_routes_see_request_locale() {
    let f = fixture().await;

    let (_, _, body) = request_get(f.router.clone(), "/whoami", Some("fr;q=0.9, en;q=0.8")).await;
    assert_eq!(body, "en");

    let (_, _, body) = request_get(f.router.clone(), "/whoami", Some("fr")).await;
    assert_eq!(body, "uk");
}

#[tokio::test]
async fn translate_outside_request_uses_active_locale() {
    let f = fixture().await;
    f.engine.init().await;
    f.engine.set_locale("en").await.unwrap();

    let vars = Vars::new().with("name", "Ann");
    assert_eq!(
        translate_in_request(&f.engine, "greeting", &vars),
        "Hello, Ann!"
    );
}
