use proc_macro::TokenStream;
use quote::quote;
use syn::{LitStr, parse_macro_input};

/// Embed every `*.json` catalog in a directory (relative to the calling
/// crate's manifest) and expand to a `glossa_core::MemorySource` keyed by
/// file stem.
///
/// ```ignore
/// let source = glossa_macro::catalog_assets!("locales");
/// let engine = LocaleEngine::builder(supported).source(source).build();
/// ```
///
/// Payloads are not parsed here: a malformed file degrades to an empty
/// catalog at runtime like any other failed load.
#[proc_macro]
pub fn catalog_assets(input: TokenStream) -> TokenStream {
    let dir = parse_macro_input!(input as LitStr);
    match expand(&dir.value()) {
        Ok(tokens) => tokens.into(),
        Err(message) => syn::Error::new(dir.span(), message).to_compile_error().into(),
    }
}

fn expand(dir: &str) -> Result<proc_macro2::TokenStream, String> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|e| format!("CARGO_MANIFEST_DIR unavailable: {e}"))?;

    let dir_path = std::path::Path::new(&manifest_dir).join(dir);
    if !dir_path.is_dir() {
        return Err(format!("catalog directory not found: {}", dir_path.display()));
    }

    let pattern = format!("{}/*.json", dir_path.display());
    let paths = glob::glob(&pattern).map_err(|e| format!("bad catalog pattern: {e}"))?;

    let mut entries = Vec::new();
    for path in paths {
        let path = path.map_err(|e| format!("unreadable catalog path: {e}"))?;
        if path.is_dir() {
            continue;
        }
        let Some(locale) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };

        // include_bytes! also makes cargo rebuild when a catalog changes
        let abs_path = path
            .canonicalize()
            .map_err(|e| format!("cannot resolve {}: {e}", path.display()))?;
        let abs_path = abs_path
            .to_str()
            .ok_or_else(|| format!("non UTF-8 path: {}", abs_path.display()))?
            .to_string();

        entries.push((locale, abs_path));
    }
    entries.sort();

    let pairs = entries.iter().map(|(locale, abs_path)| {
        quote! { (#locale, include_bytes!(#abs_path) as &[u8]) }
    });

    Ok(quote! {
        ::glossa_core::MemorySource::from_static(&[ #(#pairs),* ])
    })
}
