/// Canonical form of a player name: trimmed, with every run of whitespace
/// collapsed to a single ASCII space.
///
/// Source rosters are inconsistent ("Olga  Carmona García" appears with a
/// double space), so every name is passed through this at ingestion and
/// every lookup name goes through it before comparison.
pub fn normalize_player_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for part in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

pub fn normalize_optional_name(raw: Option<&str>) -> Option<String> {
    let name = normalize_player_name(raw?);
    if name.is_empty() { None } else { Some(name) }
}
