use crate::core::{Dialect, EdiError};

/// Pick the dialect of a raw document by scanning for its root tags.
///
/// A `Workbook` element means Excel; a `File` or `Document` element means
/// Lingo. Nothing is parsed, so this runs before either codec sees the input.
pub fn detect(raw: &str) -> Result<Dialect, EdiError> {
    if has_tag(raw, "Workbook") {
        return Ok(Dialect::Excel);
    }
    if has_tag(raw, "File") || has_tag(raw, "Document") {
        return Ok(Dialect::Lingo);
    }
    let snippet: String = raw.trim_start().chars().take(60).collect();
    Err(EdiError::UnsupportedFormat(format!(
        "no Workbook, File or Document element found (starts with {snippet:?})"
    )))
}

/// True when `raw` contains an opening tag named `name`, with or without a
/// namespace prefix (`<ss:Workbook ...>`).
fn has_tag(raw: &str, name: &str) -> bool {
    raw.match_indices('<').any(|(i, _)| {
        let rest = &raw[i + 1..];
        let tag_end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        let local = tag.rsplit(':').next().unwrap_or(tag);
        local == name
    })
}
