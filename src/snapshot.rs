use std::collections::HashMap;

use crate::{
    cssom::{CssomResult, RuleId, StyleRule},
    descriptor::FontProperty,
};

/// Font properties of a rule as the stylesheet author wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalStyle {
    pub font_weight: String,
    pub font_style: String,
    pub font_stretch: String,
}

impl OriginalStyle {
    fn read<R: StyleRule>(rule: &R) -> CssomResult<Self> {
        Ok(Self {
            font_weight: rule.property(FontProperty::Weight)?,
            font_style: rule.property(FontProperty::Style)?,
            font_stretch: rule.property(FontProperty::Stretch)?,
        })
    }

    /// Whether the author left `property` unset. Size is never tracked, so
    /// it always counts as unset.
    pub fn is_unset(&self, property: FontProperty) -> bool {
        match property {
            FontProperty::Weight => self.font_weight.is_empty(),
            FontProperty::Style => self.font_style.is_empty(),
            FontProperty::Stretch => self.font_stretch.is_empty(),
            FontProperty::Size => true,
        }
    }
}

/// Side table of original styles, keyed by rule identity.
///
/// An entry is written on the first visit of a rule and never replaced, so
/// values the patcher wrote itself are never mistaken for author values.
#[derive(Debug, Default)]
pub struct SnapshotTable {
    originals: HashMap<RuleId, OriginalStyle>,
}

impl SnapshotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RuleId) -> Option<&OriginalStyle> {
        self.originals.get(&id)
    }

    /// Returns the snapshot of `rule`, reading it from the rule on first use.
    pub fn capture<R: StyleRule>(&mut self, rule: &R) -> CssomResult<&OriginalStyle> {
        let id = rule.id();
        if !self.originals.contains_key(&id) {
            let original = OriginalStyle::read(rule)?;
            self.originals.insert(id, original);
        }
        Ok(&self.originals[&id])
    }
}
