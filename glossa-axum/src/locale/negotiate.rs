use glossa_core::LocaleCode;

/// Pick the best supported locale for an `Accept-Language` header.
///
/// Tags are tried by descending `q`, header order breaking ties. A tag
/// matches a supported code case-insensitively, or through its primary
/// subtag (`en-US` → `en`). Falls back to `default`.
pub fn negotiate(header: Option<&str>, supported: &[LocaleCode], default: &str) -> LocaleCode {
    let Some(header) = header else {
        return default.to_string();
    };

    // "uk-UA,uk;q=0.9,en;q=0.8" -> [(1.0, "uk-ua"), (0.9, "uk"), (0.8, "en")]
    let mut tags: Vec<(f32, String)> = header
        .split(',')
        .filter_map(|part| {
            let mut sections = part.split(';');
            let tag = sections.next()?.trim().to_lowercase();
            let q = sections
                .find_map(|s| s.trim().strip_prefix("q="))
                .and_then(|v| v.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (!tag.is_empty() && q > 0.0).then_some((q, tag))
        })
        .collect();

    tags.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    tags.iter()
        .find_map(|(_, tag)| match_supported(tag, supported))
        .unwrap_or_else(|| default.to_string())
}

fn match_supported(tag: &str, supported: &[LocaleCode]) -> Option<LocaleCode> {
    let find = |candidate: &str| {
        supported
            .iter()
            .find(|code| code.eq_ignore_ascii_case(candidate))
            .cloned()
    };

    find(tag).or_else(|| {
        let (primary, _) = tag.split_once('-')?;
        find(primary)
    })
}
