//! Host Runtime Introspector
//!
//! Read-only adapter over [`HostRuntime`] for a single querying stage. Structural
//! answers (stage list, input enumerators, downstream handle) are fetched once and
//! memoized for the stage's lifetime. Collection cursors are shared host handles, so
//! their position stays live even though the handle itself is cached.
//!
//! All host coupling lives here: if the host reports a layout this crate does not
//! understand, every query fails with [`ProgressError::IntrospectionUnavailable`].

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ProgressError;
use crate::host::{HostRuntime, InputSource, PipelineItem, StageHandle, StageId, SUPPORTED_LAYOUT_VERSIONS};

type Memo<T> = Result<T, ProgressError>;

pub struct Introspector {
    host: Rc<dyn HostRuntime>,
    stage: StageId,
    stages: OnceCell<Memo<Rc<[StageHandle]>>>,
    inputs: RefCell<HashMap<usize, Memo<InputSource>>>,
    downstream: OnceCell<Memo<Option<StageHandle>>>,
    reported: Cell<bool>,
}

impl Introspector {
    pub fn new(host: Rc<dyn HostRuntime>, stage: StageId) -> Self {
        Self {
            host,
            stage,
            stages: OnceCell::new(),
            inputs: RefCell::new(HashMap::new()),
            downstream: OnceCell::new(),
            reported: Cell::new(false),
        }
    }

    pub fn stage_id(&self) -> StageId {
        self.stage
    }

    fn check_layout(&self) -> Result<(), ProgressError> {
        let version = self.host.layout_version();
        if SUPPORTED_LAYOUT_VERSIONS.contains(&version) {
            Ok(())
        } else {
            Err(ProgressError::IntrospectionUnavailable(format!(
                "unsupported host layout version {version}"
            )))
        }
    }

    /// Ordered stage list of the pipeline the querying stage belongs to.
    pub fn pipeline_stages(&self) -> Result<Rc<[StageHandle]>, ProgressError> {
        self.stages
            .get_or_init(|| {
                self.check_layout()?;
                self.host.stages().map(Rc::from)
            })
            .clone()
    }

    /// Position of the querying stage, `None` if the host cannot place it.
    pub fn ordinal(&self) -> Option<usize> {
        let stages = self.degrade(self.pipeline_stages())?;
        let ordinal = stages.iter().position(|s| s.id == self.stage);
        if ordinal.is_none() {
            self.report(&ProgressError::IntrospectionUnavailable(format!(
                "stage {} not found in pipeline",
                self.stage
            )));
        }
        ordinal
    }

    /// Input enumerator of the stage at `ordinal`.
    pub fn input_enumerator(&self, ordinal: usize) -> Result<InputSource, ProgressError> {
        if let Some(memo) = self.inputs.borrow().get(&ordinal) {
            return memo.clone();
        }

        let memo = self
            .check_layout()
            .and_then(|()| self.host.input_source(ordinal));
        self.inputs.borrow_mut().insert(ordinal, memo.clone());
        memo
    }

    /// Input of the whole pipeline, i.e. of its first stage.
    pub fn pipeline_input(&self) -> Result<InputSource, ProgressError> {
        self.input_enumerator(0)
    }

    /// Item the host is currently handing to the stage at `ordinal`.
    ///
    /// Not memoized: it changes with every item.
    pub fn current_input_item(&self, ordinal: usize) -> Result<Option<PipelineItem>, ProgressError> {
        self.check_layout()?;
        self.host.current_item(ordinal)
    }

    /// Stage receiving the querying stage's output.
    pub fn downstream_stage(&self) -> Result<Option<StageHandle>, ProgressError> {
        self.downstream
            .get_or_init(|| {
                self.check_layout()?;
                let ordinal = self.pipeline_stages()?.iter().position(|s| s.id == self.stage);
                match ordinal {
                    Some(ordinal) => self.host.downstream(ordinal),
                    None => Err(ProgressError::IntrospectionUnavailable(format!(
                        "stage {} not found in pipeline",
                        self.stage
                    ))),
                }
            })
            .clone()
    }

    /// Turn a failed query into its safe default, logging the first failure only.
    pub fn degrade<T>(&self, result: Result<T, ProgressError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    fn report(&self, err: &ProgressError) {
        if !self.reported.replace(true) {
            tracing::debug!(stage = %self.stage, error = %err, "host introspection unavailable, progress disabled");
        }
    }
}

impl std::fmt::Debug for Introspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Introspector")
            .field("stage", &self.stage)
            .field("stages", &self.stages.get())
            .field("reported", &self.reported.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixedHost;

    /// Counts how often the host is actually asked.
    struct CountingHost {
        inner: FixedHost,
        stage_calls: Cell<usize>,
        input_calls: Cell<usize>,
    }

    impl HostRuntime for CountingHost {
        fn layout_version(&self) -> u32 {
            self.inner.layout_version()
        }

        fn stages(&self) -> Result<Vec<StageHandle>, ProgressError> {
            self.stage_calls.set(self.stage_calls.get() + 1);
            self.inner.stages()
        }

        fn input_source(&self, ordinal: usize) -> Result<InputSource, ProgressError> {
            self.input_calls.set(self.input_calls.get() + 1);
            self.inner.input_source(ordinal)
        }

        fn current_item(&self, ordinal: usize) -> Result<Option<PipelineItem>, ProgressError> {
            self.inner.current_item(ordinal)
        }
    }

    fn two_stage_host() -> FixedHost {
        FixedHost::new(vec![
            StageHandle::aware(1, "generate"),
            StageHandle::aware(2, "transform"),
        ])
        .with_collection(vec![PipelineItem::from(1), PipelineItem::from(2)])
    }

    #[test]
    fn test_structural_queries_are_memoized() {
        let host = Rc::new(CountingHost {
            inner: two_stage_host(),
            stage_calls: Cell::new(0),
            input_calls: Cell::new(0),
        });
        let introspector = Introspector::new(host.clone(), StageId(2));

        for _ in 0..3 {
            assert_eq!(introspector.ordinal(), Some(1));
            assert!(introspector.pipeline_input().unwrap().is_multi());
        }
        assert_eq!(host.stage_calls.get(), 1);
        assert_eq!(host.input_calls.get(), 1);

        // The host's default downstream lookup asks for the stage list once more.
        assert_eq!(introspector.downstream_stage().unwrap(), None);
        assert_eq!(introspector.downstream_stage().unwrap(), None);
        assert_eq!(host.stage_calls.get(), 2);
    }

    #[test]
    fn test_cached_cursor_stays_live() {
        let host = Rc::new(two_stage_host());
        let introspector = Introspector::new(host.clone(), StageId(1));

        let input = introspector.pipeline_input().unwrap();
        host.cursor().unwrap().advance();
        host.cursor().unwrap().advance();

        assert_eq!(input.cursor().unwrap().current_index(), Some(1));
    }

    #[test]
    fn test_unsupported_layout_fails_every_query() {
        let host = Rc::new(two_stage_host().with_layout_version(99));
        let introspector = Introspector::new(host, StageId(1));

        assert!(matches!(
            introspector.pipeline_stages(),
            Err(ProgressError::IntrospectionUnavailable(_))
        ));
        assert!(introspector.pipeline_input().is_err());
        assert!(introspector.downstream_stage().is_err());
        assert!(introspector.current_input_item(0).is_err());
        assert_eq!(introspector.ordinal(), None);
    }

    #[test]
    fn test_unknown_stage_has_no_ordinal() {
        let introspector = Introspector::new(Rc::new(two_stage_host()), StageId(42));
        assert_eq!(introspector.ordinal(), None);
        assert!(introspector.downstream_stage().is_err());
    }
}
