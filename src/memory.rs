//! A scriptable in-memory object model.
//!
//! Mirrors the small slice of the CSSOM the patcher touches, including sheets
//! that hide their rules and accesses that throw, so the pipeline can run
//! in native tests.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt::Write,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    cssom::{CssomError, CssomResult, ReadyState, RuleId, StyleDocument, StyleRule},
    descriptor::FontProperty,
};

static NEXT_RULE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
enum RuleKind {
    Style { selector: String },
    FontFace,
    Group { text: String },
}

#[derive(Debug)]
struct RuleData {
    id: RuleId,
    kind: RuleKind,
    declarations: RefCell<BTreeMap<String, String>>,
    failing_writes: Cell<u32>,
}

/// Shared handle to a rule. Clones refer to the same rule.
#[derive(Debug, Clone)]
pub struct MemoryRule(Rc<RuleData>);

impl MemoryRule {
    fn new(kind: RuleKind, declarations: &[(&str, &str)]) -> Self {
        Self(Rc::new(RuleData {
            id: RuleId(NEXT_RULE_ID.fetch_add(1, Ordering::Relaxed)),
            kind,
            declarations: RefCell::new(
                declarations
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            ),
            failing_writes: Cell::new(0),
        }))
    }

    /// A plain style rule such as `p { font-family: body }`.
    pub fn style(selector: &str, declarations: &[(&str, &str)]) -> Self {
        Self::new(
            RuleKind::Style {
                selector: selector.to_owned(),
            },
            declarations,
        )
    }

    /// An `@font-face` rule. Like in WebKit it exposes a style declaration.
    pub fn font_face(declarations: &[(&str, &str)]) -> Self {
        Self::new(RuleKind::FontFace, declarations)
    }

    /// A grouping rule such as `@media`, which has no style of its own.
    pub fn group(text: &str) -> Self {
        Self::new(
            RuleKind::Group {
                text: text.to_owned(),
            },
            &[],
        )
    }

    /// Makes the next `count` property writes on this rule throw.
    pub fn fail_writes(&self, count: u32) {
        self.0.failing_writes.set(count);
    }

    /// Current value of the declaration `name`, or an empty string.
    pub fn value(&self, name: &str) -> String {
        self.0
            .declarations
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn serialize_declarations(&self) -> String {
        let mut text = String::new();
        for (name, value) in self.0.declarations.borrow().iter() {
            let _ = write!(text, " {name}: {value};");
        }
        text
    }
}

impl StyleRule for MemoryRule {
    fn id(&self) -> RuleId {
        self.0.id
    }

    fn has_style(&self) -> bool {
        !matches!(self.0.kind, RuleKind::Group { .. })
    }

    fn css_text(&self) -> String {
        match &self.0.kind {
            RuleKind::Style { selector } => {
                format!("{selector} {{{} }}", self.serialize_declarations())
            }
            RuleKind::FontFace => format!("@font-face {{{} }}", self.serialize_declarations()),
            RuleKind::Group { text } => text.clone(),
        }
    }

    fn font(&self) -> CssomResult<String> {
        Ok(self.value("font"))
    }

    fn font_family(&self) -> CssomResult<String> {
        Ok(self.value("font-family"))
    }

    fn property(&self, property: FontProperty) -> CssomResult<String> {
        Ok(self.value(property.css_name()))
    }

    fn set_property(&self, property: FontProperty, value: &str) -> CssomResult<()> {
        if !self.has_style() {
            return Err(CssomError::Write {
                property: property.css_name(),
                message: "rule has no style declaration".into(),
            });
        }
        if take_failure(&self.0.failing_writes) {
            return Err(CssomError::Write {
                property: property.css_name(),
                message: "NoModificationAllowedError".into(),
            });
        }
        self.0
            .declarations
            .borrow_mut()
            .insert(property.css_name().to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Debug)]
struct MemorySheet {
    /// `None` for sheets whose rules are hidden from script.
    rules: Option<Vec<MemoryRule>>,
    failing_reads: Cell<u32>,
}

#[derive(Debug)]
struct DocumentData {
    sheets: RefCell<Vec<MemorySheet>>,
    elements: RefCell<Vec<(String, String)>>,
    has_head: bool,
    ready_state: Cell<ReadyState>,
    failing_sheet_list_reads: Cell<u32>,
}

/// Shared handle to an in-memory document. Clones refer to the same document.
#[derive(Debug, Clone)]
pub struct MemoryDocument(Rc<DocumentData>);

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// A loading document with an empty `<head>` and no sheets.
    pub fn new() -> Self {
        Self::with_head(true)
    }

    pub fn without_head() -> Self {
        Self::with_head(false)
    }

    fn with_head(has_head: bool) -> Self {
        Self(Rc::new(DocumentData {
            sheets: RefCell::default(),
            elements: RefCell::default(),
            has_head,
            ready_state: Cell::new(ReadyState::Loading),
            failing_sheet_list_reads: Cell::new(0),
        }))
    }

    /// Attaches a sheet and returns its index.
    pub fn add_sheet(&self, rules: Vec<MemoryRule>) -> u32 {
        self.push_sheet(Some(rules))
    }

    /// Attaches a sheet whose rule list reads as null.
    pub fn add_hidden_sheet(&self) -> u32 {
        self.push_sheet(None)
    }

    fn push_sheet(&self, rules: Option<Vec<MemoryRule>>) -> u32 {
        let mut sheets = self.0.sheets.borrow_mut();
        sheets.push(MemorySheet {
            rules,
            failing_reads: Cell::new(0),
        });
        (sheets.len() - 1) as u32
    }

    /// Makes the next `count` reads of the sheet list throw.
    pub fn fail_sheet_list(&self, count: u32) {
        self.0.failing_sheet_list_reads.set(count);
    }

    /// Makes the next `count` reads of the rules of sheet `index` throw.
    pub fn fail_sheet_rules(&self, index: u32, count: u32) {
        if let Some(sheet) = self.0.sheets.borrow().get(index as usize) {
            sheet.failing_reads.set(count);
        }
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        self.0.ready_state.set(state);
    }

    /// Text of the element with the given id.
    pub fn element_text(&self, id: &str) -> Option<String> {
        self.0
            .elements
            .borrow()
            .iter()
            .find(|(element_id, _)| element_id == id)
            .map(|(_, text)| text.clone())
    }

    pub fn element_count(&self) -> usize {
        self.0.elements.borrow().len()
    }
}

fn take_failure(counter: &Cell<u32>) -> bool {
    let remaining = counter.get();
    if remaining > 0 {
        counter.set(remaining - 1);
        true
    } else {
        false
    }
}

impl StyleDocument for MemoryDocument {
    type Rule = MemoryRule;

    fn style_sheet_count(&self) -> CssomResult<u32> {
        if take_failure(&self.0.failing_sheet_list_reads) {
            return Err(CssomError::StyleSheets("sheet list is being updated".into()));
        }
        Ok(self.0.sheets.borrow().len() as u32)
    }

    fn sheet_rules(&self, index: u32) -> CssomResult<Option<Vec<MemoryRule>>> {
        let sheets = self.0.sheets.borrow();
        let Some(sheet) = sheets.get(index as usize) else {
            return Ok(None);
        };
        if take_failure(&sheet.failing_reads) {
            return Err(CssomError::SheetRules {
                sheet: index,
                message: "InvalidAccessError".into(),
            });
        }
        Ok(sheet.rules.clone())
    }

    fn ready_state(&self) -> ReadyState {
        self.0.ready_state.get()
    }

    fn has_element(&self, id: &str) -> bool {
        self.element_text(id).is_some()
    }

    fn append_style_element(&self, id: &str, text: &str) -> CssomResult<()> {
        if !self.0.has_head {
            return Err(CssomError::MissingHead);
        }
        self.0
            .elements
            .borrow_mut()
            .push((id.to_owned(), text.to_owned()));
        // The new element contributes a sheet; its rules are not parsed here.
        self.push_sheet(Some(Vec::new()));
        Ok(())
    }

    fn set_element_text(&self, id: &str, text: &str) -> CssomResult<bool> {
        let mut elements = self.0.elements.borrow_mut();
        match elements.iter_mut().find(|(element_id, _)| element_id == id) {
            Some((_, current)) => {
                *current = text.to_owned();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_serialize_their_declarations() {
        let rule = MemoryRule::style("p", &[("font-family", "body")]);
        assert_eq!(rule.css_text(), "p { font-family: body; }");
        rule.set_property(FontProperty::Weight, "600").unwrap();
        assert_eq!(rule.css_text(), "p { font-family: body; font-weight: 600; }");

        let face = MemoryRule::font_face(&[("font-family", "body")]);
        assert!(face.css_text().starts_with("@font-face"));
        assert!(face.has_style());

        let group = MemoryRule::group("@media print { }");
        assert!(!group.has_style());
        assert!(group.set_property(FontProperty::Size, "1em").is_err());
    }

    #[test]
    fn failing_writes_leave_the_value_untouched() {
        let rule = MemoryRule::style("p", &[("font-family", "body")]);
        rule.fail_writes(1);
        let error = rule.set_property(FontProperty::Weight, "600").unwrap_err();
        assert!(!error.is_transient());
        assert_eq!(rule.value("font-weight"), "");
        rule.set_property(FontProperty::Weight, "600").unwrap();
        assert_eq!(rule.value("font-weight"), "600");
    }

    #[test]
    fn injected_failures_are_consumed() {
        let document = MemoryDocument::new();
        let sheet = document.add_sheet(vec![]);
        document.fail_sheet_list(1);
        document.fail_sheet_rules(sheet, 1);

        assert!(document.style_sheet_count().is_err());
        assert_eq!(document.style_sheet_count().unwrap(), 1);
        assert!(document.sheet_rules(sheet).is_err());
        assert!(document.sheet_rules(sheet).unwrap().is_some());
    }

    #[test]
    fn hidden_sheets_have_no_rule_list() {
        let document = MemoryDocument::new();
        let sheet = document.add_hidden_sheet();
        assert!(document.sheet_rules(sheet).unwrap().is_none());
    }

    #[test]
    fn appending_a_style_element_adds_a_sheet() {
        let document = MemoryDocument::new();
        document.append_style_element("faces", "@font-face {}").unwrap();
        assert_eq!(document.style_sheet_count().unwrap(), 1);
        assert_eq!(document.element_text("faces").as_deref(), Some("@font-face {}"));

        let headless = MemoryDocument::without_head();
        assert!(matches!(
            headless.append_style_element("faces", ""),
            Err(CssomError::MissingHead)
        ));
    }
}
