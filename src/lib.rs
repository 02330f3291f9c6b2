use std::{cell::RefCell, rc::Rc};

use wasm_bindgen::prelude::*;
use web_sys::Window;

pub mod config;
pub mod cssom;
pub mod descriptor;
pub mod error;
pub mod injector;
mod logging;
#[cfg(test)]
mod memory;
pub mod patcher;
pub mod rewriter;
pub mod scheduler;
pub mod snapshot;
pub mod web;

use crate::{
    config::StylerOptions,
    descriptor::DescriptorTable,
    error::StylerError,
    patcher::TypographyPatcher,
    web::{spawn_poll_loop, WebDocument},
};

/// Keeps the stylesheets of the current page in line with the host's text
/// styles.
#[wasm_bindgen]
pub struct DynamicTypeStyler {
    patcher: Rc<RefCell<TypographyPatcher<WebDocument>>>,
    window: Window,
    started: bool,
}

#[wasm_bindgen]
impl DynamicTypeStyler {
    #[wasm_bindgen(constructor)]
    pub fn new(
        font_descriptors: JsValue,
        font_face_declarations: String,
        options: JsValue,
    ) -> Result<DynamicTypeStyler, JsValue> {
        console_error_panic_hook::set_once();

        let options = parse_options(options)?;
        logging::init(options.level_filter());
        let table = parse_descriptors(font_descriptors)?;
        if table.is_empty() {
            log::warn!("no text styles supplied, rules will be left unchanged");
        } else {
            log::debug!("loaded {} text styles", table.len());
        }

        let window = web_sys::window().ok_or(StylerError::NoWindow)?;
        let document = window.document().ok_or(StylerError::NoDocument)?;

        Ok(Self {
            patcher: Rc::new(RefCell::new(TypographyPatcher::new(
                WebDocument::new(document),
                table,
                font_face_declarations,
                options,
            ))),
            window,
            started: false,
        })
    }

    /// Injects the font faces, rewrites the current sheets and keeps watching
    /// for new ones until the document is loaded. Only the first call has an
    /// effect.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.started {
            return Ok(());
        }
        self.patcher
            .borrow_mut()
            .start()
            .map_err(StylerError::from)?;
        self.started = true;
        spawn_poll_loop(self.patcher.clone(), self.window.clone());
        Ok(())
    }

    /// Applies the text styles of a new content size.
    pub fn update(
        &self,
        font_descriptors: JsValue,
        font_face_declarations: String,
    ) -> Result<(), JsValue> {
        let table = parse_descriptors(font_descriptors)?;
        self.patcher
            .borrow_mut()
            .update(table, font_face_declarations)
            .map_err(StylerError::from)?;
        Ok(())
    }

    /// Rewrites the current sheets once.
    pub fn rewrite(&self) -> Result<(), JsValue> {
        self.patcher
            .borrow_mut()
            .rewrite()
            .map_err(StylerError::from)?;
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = isDone)]
    pub fn is_done(&self) -> bool {
        self.patcher.borrow().is_done()
    }
}

/// Fire-and-forget entry point for hosts that evaluate a single call.
#[wasm_bindgen(js_name = applyDynamicType)]
pub fn apply_dynamic_type(
    font_descriptors: JsValue,
    font_face_declarations: String,
) -> Result<(), JsValue> {
    let mut styler =
        DynamicTypeStyler::new(font_descriptors, font_face_declarations, JsValue::UNDEFINED)?;
    styler.start()
}

fn parse_descriptors(value: JsValue) -> Result<DescriptorTable, StylerError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| StylerError::deserialize("font descriptors", e))
}

fn parse_options(value: JsValue) -> Result<StylerOptions, StylerError> {
    if value.is_undefined() || value.is_null() {
        return Ok(StylerOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| StylerError::deserialize("options", e))
}
