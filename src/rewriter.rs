use crate::{
    cssom::{CssomResult, StyleDocument, StyleRule},
    descriptor::{DescriptorTable, FontProperty},
    snapshot::SnapshotTable,
};

/// What a single pass over the document did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub sheets: u32,
    /// Sheets whose rules were hidden.
    pub sheets_skipped: u32,
    pub rules: u32,
    pub matched: u32,
    pub font_face_skipped: u32,
    pub properties_written: u32,
}

/// Backfills descriptor values into every matching style rule of every
/// accessible sheet.
///
/// Rules nested in grouping rules such as `@media` are not visited.
pub fn rewrite<D: StyleDocument>(
    document: &D,
    table: &DescriptorTable,
    snapshots: &mut SnapshotTable,
) -> CssomResult<RewriteReport> {
    let mut report = RewriteReport::default();

    let count = document.style_sheet_count()?;
    for index in 0..count {
        report.sheets += 1;
        let Some(rules) = document.sheet_rules(index)? else {
            report.sheets_skipped += 1;
            continue;
        };
        for rule in &rules {
            rewrite_rule(rule, table, snapshots, &mut report)?;
        }
    }

    log::debug!("rewrite pass finished: {report:?}");
    Ok(report)
}

fn rewrite_rule<R: StyleRule>(
    rule: &R,
    table: &DescriptorTable,
    snapshots: &mut SnapshotTable,
    report: &mut RewriteReport,
) -> CssomResult<()> {
    if !rule.has_style() {
        return Ok(());
    }
    report.rules += 1;

    let original = snapshots.capture(rule)?;

    let font = rule.font()?;
    let font_family = rule.font_family()?;
    if font.is_empty() && font_family.is_empty() {
        return Ok(());
    }

    let Some(descriptor) = table.find(&font, &font_family) else {
        return Ok(());
    };
    report.matched += 1;

    if rule.css_text().contains("@font-face") {
        report.font_face_skipped += 1;
        return Ok(());
    }

    for property in FontProperty::ALL {
        if !original.is_unset(property) {
            continue;
        }
        if let Some(value) = descriptor.value(property) {
            rule.set_property(property, value)?;
            report.properties_written += 1;
        }
    }
    Ok(())
}
