use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use js_sys::{Object, Promise, Reflect, WeakMap};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{CssRule, CssRuleList, CssStyleDeclaration, Document, StyleSheetList, Window};

use crate::{
    cssom::{CssomError, CssomResult, ReadyState, RuleId, StyleDocument, StyleRule},
    descriptor::FontProperty,
    patcher::TypographyPatcher,
    scheduler::TickOutcome,
};

fn describe(error: &JsValue) -> String {
    error.as_string().unwrap_or_else(|| format!("{error:?}"))
}

/// A CSSOM rule of the live page.
pub struct WebRule {
    id: RuleId,
    rule: CssRule,
    style: Option<CssStyleDeclaration>,
}

impl WebRule {
    fn read(&self, name: &str) -> CssomResult<String> {
        match &self.style {
            Some(style) => style
                .get_property_value(name)
                .map_err(|e| CssomError::Style(describe(&e))),
            None => Ok(String::new()),
        }
    }
}

impl StyleRule for WebRule {
    fn id(&self) -> RuleId {
        self.id
    }

    fn has_style(&self) -> bool {
        self.style.is_some()
    }

    fn css_text(&self) -> String {
        self.rule.css_text()
    }

    fn font(&self) -> CssomResult<String> {
        self.read("font")
    }

    fn font_family(&self) -> CssomResult<String> {
        self.read("font-family")
    }

    fn property(&self, property: FontProperty) -> CssomResult<String> {
        self.read(property.css_name())
    }

    fn set_property(&self, property: FontProperty, value: &str) -> CssomResult<()> {
        let write_error = |message: String| CssomError::Write {
            property: property.css_name(),
            message,
        };
        let style = self
            .style
            .as_ref()
            .ok_or_else(|| write_error("rule has no style declaration".into()))?;
        style
            .set_property(property.css_name(), value)
            .map_err(|e| write_error(describe(&e)))
    }
}

/// The page document. Rules get their identity from a weak map keyed by the
/// rule object, so nothing is stored on the CSSOM objects themselves.
pub struct WebDocument {
    document: Document,
    identities: WeakMap,
    next_id: Cell<u64>,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            identities: WeakMap::new(),
            next_id: Cell::new(1),
        }
    }

    fn identify(&self, rule: &Object) -> RuleId {
        if let Some(id) = self.identities.get(rule).as_f64() {
            return RuleId(id as u64);
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.identities.set(rule, &JsValue::from_f64(id as f64));
        RuleId(id)
    }

    fn style_sheets(&self) -> CssomResult<StyleSheetList> {
        Reflect::get(&self.document, &JsValue::from_str("styleSheets"))
            .and_then(|sheets| sheets.dyn_into::<StyleSheetList>())
            .map_err(|e| CssomError::StyleSheets(describe(&e)))
    }

    fn wrap(&self, rule: CssRule) -> CssomResult<WebRule> {
        // Read through `Reflect` so that every rule kind exposing a `style`,
        // `@font-face` included, is seen.
        let style = Reflect::get(&rule, &JsValue::from_str("style"))
            .map_err(|e| CssomError::Style(describe(&e)))?
            .dyn_into::<CssStyleDeclaration>()
            .ok();
        Ok(WebRule {
            id: self.identify(&rule),
            rule,
            style,
        })
    }
}

impl StyleDocument for WebDocument {
    type Rule = WebRule;

    fn style_sheet_count(&self) -> CssomResult<u32> {
        Ok(self.style_sheets()?.length())
    }

    fn sheet_rules(&self, index: u32) -> CssomResult<Option<Vec<WebRule>>> {
        let Some(sheet) = self.style_sheets()?.item(index) else {
            return Ok(None);
        };
        let sheet_error = |e: JsValue| CssomError::SheetRules {
            sheet: index,
            message: describe(&e),
        };
        let rules = Reflect::get(&sheet, &JsValue::from_str("cssRules")).map_err(sheet_error)?;
        if rules.is_null() || rules.is_undefined() {
            return Ok(None);
        }
        let rules = rules.dyn_into::<CssRuleList>().map_err(sheet_error)?;

        let mut wrapped = Vec::with_capacity(rules.length() as usize);
        for position in 0..rules.length() {
            if let Some(rule) = rules.item(position) {
                wrapped.push(self.wrap(rule)?);
            }
        }
        Ok(Some(wrapped))
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::parse(&self.document.ready_state())
    }

    fn has_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn append_style_element(&self, id: &str, text: &str) -> CssomResult<()> {
        let head = self.document.head().ok_or(CssomError::MissingHead)?;
        let element = self
            .document
            .create_element("style")
            .map_err(|e| CssomError::Dom(describe(&e)))?;
        element.set_id(id);
        element.set_text_content(Some(text));
        head.append_child(&element)
            .map_err(|e| CssomError::Dom(describe(&e)))?;
        Ok(())
    }

    fn set_element_text(&self, id: &str, text: &str) -> CssomResult<bool> {
        match self.document.get_element_by_id(id) {
            Some(element) => {
                element.set_text_content(Some(text));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

async fn sleep(window: &Window, millis: i32) -> Result<(), JsValue> {
    let mut scheduled = Ok(0);
    let promise = Promise::new(&mut |resolve, _reject| {
        scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
    });
    scheduled?;
    JsFuture::from(promise).await?;
    Ok(())
}

/// Polls the document until it has finished loading. Each tick borrows the
/// patcher only for its own duration.
pub fn spawn_poll_loop(patcher: Rc<RefCell<TypographyPatcher<WebDocument>>>, window: Window) {
    spawn_local(async move {
        let interval = {
            let millis = patcher.borrow().options().poll_interval_ms;
            i32::try_from(millis).unwrap_or(i32::MAX)
        };
        loop {
            if let Err(error) = sleep(&window, interval).await {
                log::error!("could not schedule poll tick: {}", describe(&error));
                return;
            }
            let outcome = patcher.borrow_mut().tick();
            match outcome {
                Ok(TickOutcome::Continue) => {}
                Ok(TickOutcome::Rescan(report)) => {
                    log::debug!("rescanned {} sheets", report.sheets);
                }
                Ok(TickOutcome::Done(_)) => {
                    log::debug!("document complete, polling stopped");
                    return;
                }
                Err(error) => log::error!("poll tick failed: {error}"),
            }
        }
    });
}
