use crate::cssom::{CssomResult, StyleDocument};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Injection {
    Injected,
    AlreadyPresent,
    Replaced,
}

/// Makes sure the `@font-face` declarations are in `<head>` exactly once,
/// using the element id as the marker.
pub fn inject_font_faces<D: StyleDocument>(
    document: &D,
    element_id: &str,
    declarations: &str,
) -> CssomResult<Injection> {
    if document.has_element(element_id) {
        return Ok(Injection::AlreadyPresent);
    }
    document.append_style_element(element_id, declarations)?;
    log::debug!("injected font-face declarations as #{element_id}");
    Ok(Injection::Injected)
}

/// Swaps in new declarations after a text size change, injecting the element
/// if it is not there yet.
pub fn replace_font_faces<D: StyleDocument>(
    document: &D,
    element_id: &str,
    declarations: &str,
) -> CssomResult<Injection> {
    if document.set_element_text(element_id, declarations)? {
        log::debug!("replaced font-face declarations in #{element_id}");
        return Ok(Injection::Replaced);
    }
    inject_font_faces(document, element_id, declarations)
}
