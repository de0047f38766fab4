use std::rc::Rc;

use super::context::{CounterLink, ProgressContext};
use super::counters::{percent_of, SharedCounters, StageCounters};
use super::frame::{ProgressFrame, RecordType};
use super::scenario::{Scenario, StageClassification};
use super::stack::FrameKey;
use super::token::parse_counter_token;
use crate::error::ProgressError;
use crate::host::{CollectionCursor, HostRuntime, PipelineItem, StageId};
use crate::introspect::Introspector;
use crate::topology::StageTopology;

/// Where a stage's counts come from, resolved once at construction.
#[derive(Debug)]
enum CounterSource {
    /// Head of a collection-fed chain: the host's cursor already holds the truth.
    Collection(Rc<CollectionCursor>),
    /// Downstream of a collection source: count against the owner's counters.
    /// Only the owner's direct consumer advances them.
    Upstream {
        owner: StageId,
        counters: SharedCounters,
        advances: bool,
    },
    Own,
}

/// Per-stage progress driver.
///
/// Created when a stage starts, it pushes the stage's frame, classifies the run
/// once and then decides, for every call the stage makes, whether a frame is
/// written, suppressed or merged into the parent's bar. Dropping it releases the
/// frame.
pub struct ProgressCoordinator {
    ctx: Rc<ProgressContext>,
    stage: StageId,
    key: FrameKey,
    own_identity: (u32, Option<u32>),
    introspector: Introspector,
    ordinal: Option<usize>,
    classification: StageClassification,
    source: CounterSource,
    counters: SharedCounters,
    activity: String,
    initial_description: Option<String>,
    last_written: Option<ProgressFrame>,
    last_percent: Option<u8>,
    displayed: bool,
    piggybacked: bool,
    disposed: bool,
}

impl ProgressCoordinator {
    pub fn new(
        ctx: Rc<ProgressContext>,
        host: Rc<dyn HostRuntime>,
        stage: StageId,
        activity: impl Into<String>,
    ) -> Self {
        let key = ctx.push_frame();
        let own_identity = ctx
            .frame(key)
            .map(|f| (f.activity_id, f.parent_activity_id))
            .unwrap_or((0, None));

        let introspector = Introspector::new(host, stage);
        let (ordinal, classification, source) = {
            let topology = StageTopology::new(&introspector, ctx.policy());
            let classification =
                StageClassification::evaluate(&topology, &introspector, ctx.enabled());
            let source = resolve_source(&ctx, &topology, &introspector, classification.scenario);
            (topology.ordinal(), classification, source)
        };

        let counters = StageCounters::shared();
        let link = match &source {
            CounterSource::Upstream {
                owner,
                counters: upstream,
                ..
            } => CounterLink {
                owner: *owner,
                counters: upstream.clone(),
            },
            CounterSource::Collection(cursor) => {
                counters.borrow_mut().begin(cursor.total_count() as u64);
                CounterLink {
                    owner: stage,
                    counters: counters.clone(),
                }
            }
            CounterSource::Own => CounterLink {
                owner: stage,
                counters: counters.clone(),
            },
        };
        ctx.register_link(stage, link);

        tracing::debug!(
            stage = %stage,
            activity_id = own_identity.0,
            scenario = %classification.scenario,
            chained = classification.chained,
            collection_fed_multi = classification.collection_fed_multi,
            "classified progress scenario"
        );

        Self {
            ctx,
            stage,
            key,
            own_identity,
            introspector,
            ordinal,
            classification,
            source,
            counters,
            activity: activity.into(),
            initial_description: None,
            last_written: None,
            last_percent: None,
            displayed: false,
            piggybacked: false,
            disposed: false,
        }
    }

    pub fn stage_id(&self) -> StageId {
        self.stage
    }

    pub fn scenario(&self) -> Scenario {
        self.classification.scenario
    }

    pub fn classification(&self) -> StageClassification {
        self.classification
    }

    /// Activity id the stage's frame is currently written under.
    pub fn activity_id(&self) -> Option<u32> {
        self.frame().map(|f| f.activity_id)
    }

    pub fn frame(&self) -> Option<ProgressFrame> {
        self.ctx.frame(self.key)
    }

    /// Counters this stage counts against.
    pub fn counters(&self) -> StageCounters {
        match &self.source {
            CounterSource::Upstream { counters, .. } => counters.borrow().clone(),
            _ => self.counters.borrow().clone(),
        }
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    pub fn is_piggybacked(&self) -> bool {
        self.piggybacked
    }

    fn silent(&self) -> bool {
        self.disposed || self.classification.scenario == Scenario::NoProgress
    }

    /// Show the stage's bar with `initial_description`.
    ///
    /// May be called for every burst of work; once the bar is up it only updates
    /// the description used by later counts.
    pub fn start(&mut self, initial_description: impl Into<String>) -> Result<(), ProgressError> {
        let description = initial_description.into();
        self.initial_description = Some(description.clone());
        if self.silent() || self.displayed {
            return Ok(());
        }

        let activity = self.activity.clone();
        self.ctx.update_frame(self.key, |f| {
            f.activity = activity;
            f.status_description = description;
            f.percent_complete = None;
            f.record_type = RecordType::Processing;
        });
        self.write_own()
    }

    /// Total of the next burst of work, from a count only this stage knows.
    pub fn set_total(&mut self, total: u64) {
        self.counters.borrow_mut().begin(total);
    }

    /// Account for one processed record and refresh the bar.
    pub fn record_processed(&mut self, item: &PipelineItem) -> Result<(), ProgressError> {
        if self.silent() {
            return Ok(());
        }
        if tracing::enabled!(tracing::Level::TRACE) {
            let input = self.ordinal.and_then(|ordinal| {
                self.introspector
                    .degrade(self.introspector.current_input_item(ordinal))
                    .flatten()
            });
            tracing::trace!(stage = %self.stage, item = %item, input = ?input, "record processed");
        }

        let (index, total) = match &self.source {
            CounterSource::Collection(cursor) => {
                let total = cursor.total_count() as u64;
                if total == 0 {
                    return Ok(());
                }
                let index = cursor.current_index().map_or(1, |i| i as u64 + 1);
                (index.min(total), total)
            }
            CounterSource::Upstream {
                counters, advances, ..
            } => {
                let mut counters = counters.borrow_mut();
                let Some(total) = counters.total().filter(|&t| t > 0) else {
                    return Ok(());
                };
                if *advances {
                    counters.advance();
                }
                if counters.processed() <= 0 {
                    return Ok(());
                }
                (counters.processed() as u64, total)
            }
            CounterSource::Own => {
                let mut counters = self.counters.borrow_mut();
                let Some(processed) = counters.advance() else {
                    return Ok(());
                };
                let Some(total) = counters.total() else {
                    return Ok(());
                };
                (processed, total)
            }
        };

        let status = self.counted_status(&format!("{index}/{total}"));
        self.write_counted(status, percent_of(index, total))
    }

    /// Replace the text under the stage's bar.
    pub fn set_current_operation(&mut self, text: impl Into<String>) -> Result<(), ProgressError> {
        if self.silent() {
            return Ok(());
        }
        let text = text.into();
        self.ctx.update_frame(self.key, |f| f.current_operation = Some(text));
        self.write_own()
    }

    /// Replace the text under the parent's bar, if there is a parent.
    pub fn set_upstream_operation(&mut self, text: impl Into<String>) -> Result<(), ProgressError> {
        if self.silent() {
            return Ok(());
        }
        let Some(parent) = self.ctx.parent_of(self.key) else {
            return Ok(());
        };
        let text = text.into();

        let mut changed = false;
        let frame = self.ctx.update_frame(parent, |f| {
            if f.current_operation.as_deref() != Some(text.as_str()) {
                f.current_operation = Some(text);
                changed = true;
            }
        });
        match frame {
            Some(frame) if changed => self.ctx.write(&frame),
            _ => Ok(()),
        }
    }

    pub fn clear_upstream_operation(&mut self) -> Result<(), ProgressError> {
        if self.silent() {
            return Ok(());
        }
        let Some(parent) = self.ctx.parent_of(self.key) else {
            return Ok(());
        };

        let mut changed = false;
        let frame = self.ctx.update_frame(parent, |f| {
            changed = f.current_operation.take().is_some();
        });
        match frame {
            Some(frame) if changed => self.ctx.write(&frame),
            _ => Ok(()),
        }
    }

    /// Suppress this stage's own bar and show `message` on the parent's bar instead.
    ///
    /// The parent keeps its trailing `i/total` counter. Only a bar the parent has
    /// already put up is borrowed. Without one, a collection-fed stage gets a bar of
    /// its own counting through the collection.
    pub fn overwrite_upstream_frame(
        &mut self,
        activity: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), ProgressError> {
        if self.silent() {
            return Ok(());
        }
        let activity = activity.into();
        let message = message.into();

        let shown_parent = self
            .ctx
            .parent_of(self.key)
            .and_then(|parent| self.ctx.frame(parent).map(|frame| (parent, frame)))
            .filter(|(_, frame)| frame.is_initialized());
        if let Some((parent, parent_frame)) = shown_parent {
            let status = match parse_counter_token(&parent_frame.status_description) {
                Ok(token) => format!("{message} ({token})"),
                Err(err) => {
                    tracing::debug!(stage = %self.stage, error = %err, "parent frame has no counter");
                    message
                }
            };
            let Some(parent_frame) = self.ctx.update_frame(parent, |f| {
                f.activity = activity;
                f.status_description = status;
            }) else {
                return Ok(());
            };
            self.ctx.write(&parent_frame)?;

            self.ctx
                .update_frame(self.key, |f| f.assume_identity_of(&parent_frame));
            self.last_written = Some(parent_frame);
            self.piggybacked = true;
            return Ok(());
        }

        let CounterSource::Collection(cursor) = &self.source else {
            return Ok(());
        };
        let total = cursor.total_count() as u64;
        if total == 0 {
            return Ok(());
        }
        let index = cursor
            .current_index()
            .map_or(1, |i| i as u64 + 1)
            .min(total);
        self.counters.borrow_mut().begin(total);

        self.ctx.update_frame(self.key, |f| {
            f.activity = activity;
            f.record_type = RecordType::Processing;
        });
        self.write_counted(
            format!("{message} ({index}/{total})"),
            percent_of(index, total),
        )
    }

    /// Close the bar once no more work can arrive for it.
    ///
    /// A collection source waits for the collection's last element and a stage
    /// counting against an upstream stage waits until that stage's total is
    /// reached; earlier calls return without writing. A bar with nothing to count
    /// against stays up until the next counted burst or [`dispose`](Self::dispose).
    pub fn complete(&mut self) -> Result<(), ProgressError> {
        if self.silent() {
            return Ok(());
        }

        match &self.source {
            CounterSource::Collection(cursor) if !cursor.is_at_last() => return Ok(()),
            CounterSource::Upstream { counters, .. } if counters.borrow().has_more() => {
                return Ok(())
            }
            _ => {}
        }
        if !self.piggybacked && !self.counted() {
            return Ok(());
        }

        if self.displayed && !self.piggybacked {
            let frame = self.ctx.update_frame(self.key, |f| {
                f.record_type = RecordType::Completed;
            });
            if let Some(frame) = frame {
                self.ctx.write(&frame)?;
            }
        }
        self.reset_life();
        Ok(())
    }

    /// Release the stage's frame. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        if self.displayed && !self.piggybacked {
            let frame = self.ctx.update_frame(self.key, |f| {
                f.record_type = RecordType::Completed;
            });
            if let Some(frame) = frame {
                if let Err(err) = self.ctx.write(&frame) {
                    tracing::warn!(stage = %self.stage, error = %err, "failed to collapse progress bar");
                }
            }
        }

        self.disposed = true;
        self.ctx.unregister_link(self.stage);
        self.ctx.pop_frame(self.key);
    }

    /// Whether a known total backs this stage's counts right now.
    fn counted(&self) -> bool {
        match &self.source {
            CounterSource::Collection(cursor) => cursor.total_count() > 0,
            CounterSource::Upstream { counters, .. } => {
                counters.borrow().total().is_some_and(|t| t > 0)
            }
            CounterSource::Own => self.counters.borrow().total().is_some_and(|t| t > 0),
        }
    }

    fn counted_status(&self, counter: &str) -> String {
        match self.initial_description.as_deref() {
            Some(description) if !description.is_empty() => format!("{description} {counter}"),
            _ => counter.to_string(),
        }
    }

    fn write_counted(&mut self, status: String, percent: u8) -> Result<(), ProgressError> {
        let percent = self.last_percent.map_or(percent, |last| percent.max(last));
        self.last_percent = Some(percent);
        tracing::trace!(stage = %self.stage, activity_id = self.own_identity.0, percent, "progress update");

        self.ctx.update_frame(self.key, |f| {
            f.status_description = status;
            f.percent_complete = Some(percent);
            f.record_type = RecordType::Processing;
        });
        self.write_own()
    }

    fn write_own(&mut self) -> Result<(), ProgressError> {
        let Some(frame) = self.ctx.frame(self.key) else {
            return Ok(());
        };
        if self.last_written.as_ref() == Some(&frame) {
            return Ok(());
        }
        self.ctx.write(&frame)?;
        self.last_written = Some(frame);
        self.displayed = true;
        Ok(())
    }

    fn reset_life(&mut self) {
        let (activity_id, parent_activity_id) = self.own_identity;
        self.ctx.update_frame(self.key, |f| {
            *f = ProgressFrame::new(activity_id, parent_activity_id);
        });
        if !matches!(self.source, CounterSource::Upstream { .. }) {
            self.counters.borrow_mut().reset();
        }
        self.initial_description = None;
        self.last_written = None;
        self.last_percent = None;
        self.displayed = false;
        self.piggybacked = false;
    }
}

fn resolve_source(
    ctx: &ProgressContext,
    topology: &StageTopology<'_>,
    introspector: &Introspector,
    scenario: Scenario,
) -> CounterSource {
    if !scenario.is_collection_fed() {
        return CounterSource::Own;
    }

    if let Some(previous) = topology.previous_aware_stage() {
        return match ctx.link_of(previous.id) {
            Some(link) => CounterSource::Upstream {
                advances: link.owner == previous.id,
                owner: link.owner,
                counters: link.counters,
            },
            None => CounterSource::Own,
        };
    }

    if !topology.is_pure_from_head() {
        return CounterSource::Own;
    }
    introspector
        .degrade(introspector.pipeline_input())
        .and_then(|input| input.cursor().cloned())
        .map_or(CounterSource::Own, CounterSource::Collection)
}

impl Drop for ProgressCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ProgressCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressCoordinator")
            .field("stage", &self.stage)
            .field("scenario", &self.classification.scenario)
            .field("source", &self.source)
            .field("displayed", &self.displayed)
            .field("piggybacked", &self.piggybacked)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgressConfig;
    use crate::host::{FixedHost, StageHandle};
    use crate::progress::RecordingWriter;

    fn items(n: i64) -> Vec<PipelineItem> {
        (1..=n).map(PipelineItem::from).collect()
    }

    fn setup(host: FixedHost) -> (Rc<RecordingWriter>, Rc<ProgressContext>, Rc<FixedHost>) {
        let writer = Rc::new(RecordingWriter::new());
        let ctx = ProgressContext::new(writer.clone(), &ProgressConfig::default());
        (writer, ctx, Rc::new(host))
    }

    fn coordinator(ctx: &Rc<ProgressContext>, host: &Rc<FixedHost>, stage: u64) -> ProgressCoordinator {
        ProgressCoordinator::new(ctx.clone(), host.clone(), StageId(stage), "Processing")
    }

    fn live_chain() -> FixedHost {
        FixedHost::new(vec![
            StageHandle::aware(1, "generate"),
            StageHandle::aware(2, "transform"),
        ])
    }

    #[test]
    fn test_first_record_moves_counter_to_one() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        assert_eq!(head.scenario(), Scenario::MultipleStages);

        head.start("Generating").unwrap();
        head.set_total(4);
        assert_eq!(head.counters().processed(), -1);

        head.record_processed(&PipelineItem::from(1)).unwrap();
        assert_eq!(head.counters().processed(), 1);
        assert_eq!(writer.percents_for(1), vec![25]);
        assert_eq!(
            writer.last_for(1).unwrap().status_description,
            "Generating 1/4"
        );
    }

    #[test]
    fn test_unknown_total_shows_operation_only() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        head.start("Generating").unwrap();

        for i in 0..10 {
            head.record_processed(&PipelineItem::from(i)).unwrap();
        }
        assert!(writer.percents_for(1).is_empty());
        assert_eq!(writer.len(), 1);

        head.set_current_operation("item 3").unwrap();
        assert_eq!(writer.len(), 2);
        assert_eq!(
            writer.last_for(1).unwrap().current_operation.as_deref(),
            Some("item 3")
        );
    }

    #[test]
    fn test_writing_before_start_is_a_contract_violation() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);

        let err = head.set_current_operation("too early").unwrap_err();
        assert!(matches!(err, ProgressError::ContractViolation { activity_id: 1, .. }));
        assert!(writer.is_empty());
    }

    #[test]
    fn test_no_progress_writes_nothing() {
        let host = FixedHost::new(vec![StageHandle::aware(1, "transform")]).with_collection(items(1));
        let (writer, ctx, host) = setup(host);
        let mut stage = coordinator(&ctx, &host, 1);
        assert_eq!(stage.scenario(), Scenario::NoProgress);

        host.cursor().unwrap().advance();
        stage.start("Transforming").unwrap();
        stage.set_total(1);
        stage.record_processed(&PipelineItem::from(1)).unwrap();
        stage.set_current_operation("1").unwrap();
        stage.complete().unwrap();
        stage.dispose();

        assert!(writer.is_empty());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_collection_source_completes_at_last_index() {
        let host = FixedHost::new(vec![StageHandle::aware(1, "transform")]).with_collection(items(3));
        let (writer, ctx, host) = setup(host);
        let mut stage = coordinator(&ctx, &host, 1);
        assert_eq!(stage.scenario(), Scenario::VariableToSingleStage);

        let cursor = host.cursor().unwrap();
        for _ in 0..2 {
            let item = cursor.advance().unwrap();
            stage.start("Transforming").unwrap();
            stage.record_processed(&item).unwrap();
            stage.complete().unwrap();
        }
        assert_eq!(writer.completed_count(1), 0);

        let item = cursor.advance().unwrap();
        stage.start("Transforming").unwrap();
        stage.record_processed(&item).unwrap();
        stage.complete().unwrap();

        assert_eq!(writer.percents_for(1), vec![33, 66, 100]);
        assert_eq!(writer.completed_count(1), 1);
        assert_eq!(
            writer.frames().iter().filter(|f| f.percent_complete.is_none()).count(),
            1,
            "the bar is shown once, not once per element"
        );

        stage.dispose();
        assert_eq!(writer.completed_count(1), 1);
    }

    #[test]
    fn test_duplicate_frames_are_suppressed() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        head.start("Generating").unwrap();
        head.set_current_operation("same").unwrap();
        head.set_current_operation("same").unwrap();
        assert_eq!(writer.len(), 2);
    }

    #[test]
    fn test_percent_never_decreases_within_a_life() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        head.start("Generating").unwrap();
        head.set_total(2);
        head.record_processed(&PipelineItem::from(1)).unwrap();
        head.record_processed(&PipelineItem::from(2)).unwrap();

        // a larger total mid-life would pull the bar back
        head.set_total(10);
        head.record_processed(&PipelineItem::from(3)).unwrap();

        assert_eq!(writer.percents_for(1), vec![50, 100, 100]);
    }

    #[test]
    fn test_upstream_operation_is_written_once() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        let mut tail = coordinator(&ctx, &host, 2);
        head.start("Generating").unwrap();

        tail.set_upstream_operation("item 1").unwrap();
        tail.set_upstream_operation("item 1").unwrap();
        assert_eq!(writer.len(), 2);
        assert_eq!(
            writer.last_for(1).unwrap().current_operation.as_deref(),
            Some("item 1")
        );

        tail.clear_upstream_operation().unwrap();
        tail.clear_upstream_operation().unwrap();
        assert_eq!(writer.len(), 3);
        assert_eq!(writer.last_for(1).unwrap().current_operation, None);
    }

    #[test]
    fn test_overwrite_keeps_parent_counter() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        let mut tail = coordinator(&ctx, &host, 2);

        head.start("Generating").unwrap();
        head.set_total(5);
        head.record_processed(&PipelineItem::from(1)).unwrap();
        head.record_processed(&PipelineItem::from(2)).unwrap();

        tail.overwrite_upstream_frame("Acting", "Acting on item").unwrap();
        let parent = writer.last_for(1).unwrap();
        assert_eq!(parent.activity, "Acting");
        assert_eq!(parent.status_description, "Acting on item (2/5)");
        assert!(tail.is_piggybacked());
        assert_eq!(tail.activity_id(), Some(1));

        tail.overwrite_upstream_frame("Acting", "Acting again").unwrap();
        assert_eq!(
            writer.last_for(1).unwrap().status_description,
            "Acting again (2/5)"
        );

        // the parent owns the bar
        tail.complete().unwrap();
        tail.dispose();
        assert_eq!(writer.completed_count(1), 0);
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_overwrite_without_counter_drops_suffix() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        let mut tail = coordinator(&ctx, &host, 2);
        head.start("Generating items").unwrap();

        tail.overwrite_upstream_frame("Acting", "Acting on item").unwrap();
        assert_eq!(
            writer.last_for(1).unwrap().status_description,
            "Acting on item"
        );
    }

    #[test]
    fn test_overwrite_without_parent_counts_collection() {
        let host = FixedHost::new(vec![StageHandle::aware(1, "action")]).with_collection(items(4));
        let (writer, ctx, host) = setup(host);
        let mut stage = coordinator(&ctx, &host, 1);

        host.cursor().unwrap().advance();
        stage.overwrite_upstream_frame("Acting", "Acting on item").unwrap();

        let frame = writer.last_for(1).unwrap();
        assert_eq!(frame.activity, "Acting");
        assert_eq!(frame.status_description, "Acting on item (1/4)");
        assert_eq!(frame.percent_complete, Some(25));
        assert!(!stage.is_piggybacked());
    }

    #[test]
    fn test_overwrite_skips_parent_that_never_started() {
        let (writer, ctx, host) = setup(live_chain());
        let head = coordinator(&ctx, &host, 1);
        let mut tail = coordinator(&ctx, &host, 2);

        tail.overwrite_upstream_frame("Acting", "Acting on item").unwrap();
        assert!(!tail.is_piggybacked());
        assert!(!head.frame().unwrap().is_initialized());

        drop(tail);
        drop(head);
        assert!(writer.is_empty());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_collection_fed_stage_without_counter_stays_up() {
        let host = FixedHost::new(vec![
            StageHandle::external(1, "sort"),
            StageHandle::aware(2, "transform"),
        ])
        .with_collection(items(3));
        let (writer, ctx, host) = setup(host);
        let mut stage = coordinator(&ctx, &host, 2);
        assert_eq!(stage.scenario(), Scenario::VariableToSingleStage);
        let id = stage.activity_id().unwrap();

        for i in 1..=3 {
            stage.start("Transforming").unwrap();
            stage.record_processed(&PipelineItem::from(i)).unwrap();
            stage.set_current_operation(format!("item {i}")).unwrap();
            stage.complete().unwrap();
        }
        assert_eq!(writer.completed_count(id), 0);
        assert!(writer.percents_for(id).is_empty());

        stage.dispose();
        assert_eq!(writer.completed_count(id), 1);
    }

    #[test]
    fn test_dispose_collapses_displayed_bar_once() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);
        head.start("Generating").unwrap();

        head.dispose();
        head.dispose();
        drop(head);
        assert_eq!(writer.completed_count(1), 1);
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.link_of(StageId(1)).is_none());
    }

    #[test]
    fn test_complete_resets_for_next_burst() {
        let (writer, ctx, host) = setup(live_chain());
        let mut head = coordinator(&ctx, &host, 1);

        for _ in 0..2 {
            head.start("Generating").unwrap();
            head.set_total(2);
            head.record_processed(&PipelineItem::from(1)).unwrap();
            head.record_processed(&PipelineItem::from(2)).unwrap();
            head.complete().unwrap();
            assert_eq!(head.frame().unwrap(), ProgressFrame::new(1, None));
        }

        assert_eq!(writer.percents_for(1), vec![50, 100, 50, 100]);
        assert_eq!(writer.completed_count(1), 2);
    }

    #[test]
    fn test_uncounted_bar_stays_up_until_dispose() {
        let (writer, ctx, host) = setup(live_chain());
        let mut tail = coordinator(&ctx, &host, 2);
        let id = tail.activity_id().unwrap();

        for i in 1..=3 {
            tail.start("Transforming").unwrap();
            tail.record_processed(&PipelineItem::from(i)).unwrap();
            tail.set_current_operation(format!("item {i}")).unwrap();
            tail.complete().unwrap();
        }
        assert_eq!(writer.completed_count(id), 0);
        assert_eq!(writer.len(), 4);

        tail.dispose();
        assert_eq!(writer.completed_count(id), 1);
    }
}
