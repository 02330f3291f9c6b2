use crate::{
    config::StylerOptions,
    cssom::{CssomResult, StyleDocument},
    descriptor::DescriptorTable,
    injector::{inject_font_faces, replace_font_faces, Injection},
    rewriter::{rewrite, RewriteReport},
    scheduler::{Phase, RescanScheduler, TickOutcome},
    snapshot::SnapshotTable,
};

/// Drives injection, rewriting and rescanning for one document.
pub struct TypographyPatcher<D> {
    document: D,
    table: DescriptorTable,
    declarations: String,
    options: StylerOptions,
    snapshots: SnapshotTable,
    scheduler: RescanScheduler,
}

impl<D: StyleDocument> TypographyPatcher<D> {
    pub fn new(
        document: D,
        table: DescriptorTable,
        declarations: String,
        options: StylerOptions,
    ) -> Self {
        Self {
            document,
            table,
            declarations,
            options,
            snapshots: SnapshotTable::new(),
            scheduler: RescanScheduler::new(),
        }
    }

    /// Injects the font faces and runs the first pass. A transient failure of
    /// that pass is left to the first poll tick, which sees the unprocessed
    /// sheets and rescans.
    pub fn start(&mut self) -> CssomResult<Option<RewriteReport>> {
        let injection = inject_font_faces(
            &self.document,
            &self.options.style_element_id,
            &self.declarations,
        )?;
        if injection == Injection::AlreadyPresent {
            log::debug!(
                "#{} already present, font faces left as they are",
                self.options.style_element_id
            );
        }
        match self
            .scheduler
            .scan(&self.document, &self.table, &mut self.snapshots)
        {
            Ok(report) => Ok(Some(report)),
            Err(error) if error.is_transient() => {
                log::debug!("initial pass deferred: {error}");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    pub fn tick(&mut self) -> CssomResult<TickOutcome> {
        self.scheduler
            .tick(&self.document, &self.table, &mut self.snapshots)
    }

    /// Applies a new descriptor table, e.g. after the host's text size
    /// changed. Snapshots are kept so author values stay protected.
    pub fn update(
        &mut self,
        table: DescriptorTable,
        declarations: String,
    ) -> CssomResult<RewriteReport> {
        self.table = table;
        self.declarations = declarations;
        let injection = replace_font_faces(
            &self.document,
            &self.options.style_element_id,
            &self.declarations,
        )?;
        log::debug!("font faces for new text size: {injection:?}");
        self.rewrite()
    }

    /// A single pass outside of the poll loop.
    pub fn rewrite(&mut self) -> CssomResult<RewriteReport> {
        rewrite(&self.document, &self.table, &mut self.snapshots)
    }

    pub fn is_done(&self) -> bool {
        self.scheduler.phase() == Phase::Done
    }

    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    pub fn options(&self) -> &StylerOptions {
        &self.options
    }

    pub fn scheduler(&self) -> &RescanScheduler {
        &self.scheduler
    }
}
