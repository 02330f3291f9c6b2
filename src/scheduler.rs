use crate::{
    cssom::{CssomResult, ReadyState, StyleDocument},
    descriptor::DescriptorTable,
    rewriter::{rewrite, RewriteReport},
    snapshot::SnapshotTable,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Polling,
    Done,
}

/// Result of one poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed; poll again after the interval.
    Continue,
    /// New sheets were rewritten; poll again after the interval.
    Rescan(RewriteReport),
    /// The document finished loading. Holds the report of a rescan done on
    /// the same tick, if any.
    Done(Option<RewriteReport>),
}

/// Watches the stylesheet count while the document loads.
#[derive(Debug)]
pub struct RescanScheduler {
    processed: u32,
    phase: Phase,
}

impl Default for RescanScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RescanScheduler {
    pub fn new() -> Self {
        Self {
            processed: 0,
            phase: Phase::Polling,
        }
    }

    /// Number of sheets seen by the last successful pass.
    pub fn processed(&self) -> u32 {
        self.processed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs a full pass and records the sheet count once it succeeded.
    pub fn scan<D: StyleDocument>(
        &mut self,
        document: &D,
        table: &DescriptorTable,
        snapshots: &mut SnapshotTable,
    ) -> CssomResult<RewriteReport> {
        let count = document.style_sheet_count()?;
        let report = rewrite(document, table, snapshots)?;
        self.processed = count;
        Ok(report)
    }

    /// One poll tick. Transient access failures leave the state untouched and
    /// are reported as [`TickOutcome::Continue`] so the same check runs again.
    /// Once the document is complete a failing pass ends polling instead, since
    /// a sheet that still throws at that point will keep throwing.
    pub fn tick<D: StyleDocument>(
        &mut self,
        document: &D,
        table: &DescriptorTable,
        snapshots: &mut SnapshotTable,
    ) -> CssomResult<TickOutcome> {
        if self.phase == Phase::Done {
            return Ok(TickOutcome::Done(None));
        }
        match self.poll(document, table, snapshots) {
            Err(error) if document.ready_state() == ReadyState::Complete => {
                log::warn!("document complete, stopped rescanning after failure: {error}");
                self.phase = Phase::Done;
                Ok(TickOutcome::Done(None))
            }
            Err(error) if error.is_transient() => {
                log::debug!("retrying after transient failure: {error}");
                Ok(TickOutcome::Continue)
            }
            outcome => outcome,
        }
    }

    fn poll<D: StyleDocument>(
        &mut self,
        document: &D,
        table: &DescriptorTable,
        snapshots: &mut SnapshotTable,
    ) -> CssomResult<TickOutcome> {
        let count = document.style_sheet_count()?;
        let report = if count > self.processed {
            Some(self.scan(document, table, snapshots)?)
        } else {
            None
        };

        if document.ready_state() == ReadyState::Complete {
            self.phase = Phase::Done;
            return Ok(TickOutcome::Done(report));
        }
        Ok(match report {
            Some(report) => TickOutcome::Rescan(report),
            None => TickOutcome::Continue,
        })
    }
}
