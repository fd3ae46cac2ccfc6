use glossa_core::{LocaleEngine, SupportedLocales, Vars};
use glossa_macro::catalog_assets;

#[tokio::test]
async fn embedded_catalogs_drive_the_engine() {
    let source = catalog_assets!("tests/assets");
    let mut locales: Vec<_> = source.locales().collect();
    locales.sort();
    assert_eq!(locales, vec!["en", "uk"]);

    let supported = SupportedLocales::new(["uk", "en"], "uk").unwrap();
    let engine = LocaleEngine::builder(supported).source(source).build();
    engine.init().await;

    assert_eq!(engine.t("hello"), "Привіт, світе!");

    engine.set_locale("en").await.unwrap();
    let vars = Vars::new().with("name", "Jason");
    assert_eq!(engine.translate("welcome", &vars), "Welcome, Jason!");
    assert_eq!(engine.t("only_uk"), "Лише українською");
    assert_eq!(engine.t("non_existent_key"), "non_existent_key");
}
