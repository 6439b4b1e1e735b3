//! Story point identifiers as the script generator writes them.

/// Longest display-text prefix kept in a generated name.
const NAME_TAG_LEN: usize = 16;

/// Build the identifier for a story point from its display text and unique id.
///
/// Whitespace is dropped and the text is lowercased and cut to 16 characters.
/// The id is then appended and anything outside `[A-Za-z0-9_]` is removed, so
/// `"Move Forward"` with id 36 becomes `moveforward36`.
pub fn unique_point_name(display_text: &str, unique_id: u32) -> String {
    let tag: String = display_text
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(NAME_TAG_LEN)
        .flat_map(char::to_lowercase)
        .collect();

    format!("{tag}{unique_id}")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
