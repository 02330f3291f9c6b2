use serde::Deserialize;

/// A font property the patcher may override on a matching rule.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FontProperty {
    Weight,
    Style,
    Stretch,
    Size,
}

impl FontProperty {
    /// Every overridable property, in the order they are applied.
    pub const ALL: [FontProperty; 4] = [
        FontProperty::Weight,
        FontProperty::Style,
        FontProperty::Stretch,
        FontProperty::Size,
    ];

    pub fn css_name(self) -> &'static str {
        match self {
            FontProperty::Weight => "font-weight",
            FontProperty::Style => "font-style",
            FontProperty::Stretch => "font-stretch",
            FontProperty::Size => "font-size",
        }
    }
}

/// Overrides for one text style, as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDescriptor {
    /// Token searched for in a rule's `font` and `font-family` text.
    pub text_style: String,
    #[serde(default)]
    pub font_weight: Option<String>,
    #[serde(default)]
    pub font_style: Option<String>,
    #[serde(default)]
    pub font_stretch: Option<String>,
    #[serde(default)]
    pub font_size: Option<String>,
}

impl FontDescriptor {
    /// The override for `property`. An empty string still counts as defined.
    pub fn value(&self, property: FontProperty) -> Option<&str> {
        match property {
            FontProperty::Weight => self.font_weight.as_deref(),
            FontProperty::Style => self.font_style.as_deref(),
            FontProperty::Stretch => self.font_stretch.as_deref(),
            FontProperty::Size => self.font_size.as_deref(),
        }
    }

    fn matches(&self, font: &str, font_family: &str) -> bool {
        (!font.is_empty() && font.contains(self.text_style.as_str()))
            || (!font_family.is_empty() && font_family.contains(self.text_style.as_str()))
    }
}

/// Ordered descriptors. Earlier entries win when several match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DescriptorTable {
    descriptors: Vec<FontDescriptor>,
}

impl DescriptorTable {
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// First descriptor whose text style appears in either string.
    pub fn find(&self, font: &str, font_family: &str) -> Option<&FontDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.matches(font, font_family))
    }
}
