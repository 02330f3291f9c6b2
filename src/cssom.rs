use thiserror::Error;

use crate::descriptor::FontProperty;

/// Stable identity of a CSSOM rule across passes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RuleId(pub u64);

/// Value of `document.readyState`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn parse(value: &str) -> Self {
        match value {
            "complete" => ReadyState::Complete,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Loading,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CssomError {
    #[error("document style sheets are not accessible: {0}")]
    StyleSheets(String),
    #[error("rules of style sheet {sheet} are not accessible: {message}")]
    SheetRules { sheet: u32, message: String },
    #[error("rule style is not accessible: {0}")]
    Style(String),
    #[error("could not write {property}: {message}")]
    Write {
        property: &'static str,
        message: String,
    },
    #[error("document has no <head> element")]
    MissingHead,
    #[error("dom operation failed: {0}")]
    Dom(String),
}

impl CssomError {
    /// Failures that are expected to go away on a later poll tick, such as a
    /// sheet that is still loading.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CssomError::StyleSheets(_) | CssomError::SheetRules { .. } | CssomError::Style(_)
        )
    }
}

pub type CssomResult<T> = Result<T, CssomError>;

/// A leaf rule of a stylesheet.
pub trait StyleRule {
    fn id(&self) -> RuleId;

    /// Whether the rule exposes a style declaration at all. Grouping rules
    /// such as `@media` do not.
    fn has_style(&self) -> bool;

    fn css_text(&self) -> String;

    /// The `font` shorthand as serialized by the style declaration.
    fn font(&self) -> CssomResult<String>;

    fn font_family(&self) -> CssomResult<String>;

    fn property(&self, property: FontProperty) -> CssomResult<String>;

    fn set_property(&self, property: FontProperty, value: &str) -> CssomResult<()>;
}

/// The parts of a document the patcher reads and writes.
pub trait StyleDocument {
    type Rule: StyleRule;

    fn style_sheet_count(&self) -> CssomResult<u32>;

    /// Rules of the sheet at `index`. `None` when the sheet hides its rules,
    /// as cross-origin sheets do.
    fn sheet_rules(&self, index: u32) -> CssomResult<Option<Vec<Self::Rule>>>;

    fn ready_state(&self) -> ReadyState;

    fn has_element(&self, id: &str) -> bool;

    /// Appends a `<style>` element with the given id and text to `<head>`.
    fn append_style_element(&self, id: &str, text: &str) -> CssomResult<()>;

    /// Replaces the text of the element with the given id. Returns false when
    /// there is no such element.
    fn set_element_text(&self, id: &str, text: &str) -> CssomResult<bool>;
}
