use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::cssom::CssomError;

#[derive(Debug, Error)]
pub enum StylerError {
    #[error(transparent)]
    Cssom(#[from] CssomError),
    #[error("invalid {what}: {message}")]
    Deserialize { what: &'static str, message: String },
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
}

impl StylerError {
    pub(crate) fn deserialize(what: &'static str, error: serde_wasm_bindgen::Error) -> Self {
        StylerError::Deserialize {
            what,
            message: error.to_string(),
        }
    }
}

impl From<StylerError> for JsValue {
    fn from(error: StylerError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}
