//! Multi-step workflows over the inbox.
//!
//! A flow is a fixed plan of steps, each with a failure policy. The flow holds
//! its own busy flag and the inbox loading indicator from the moment it is
//! started until its last step settles.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use oceandesk_api::Transport;

use crate::error::{Error, Result};
use crate::guard::BusyFlag;
use crate::store::inbox::InboxStore;
use crate::store::lock;

/// A user-triggered workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Generate synthetic emails, then reload the inbox.
    LoadMockThenRefresh,
    /// Categorize and extract action items, then reload the inbox.
    ProcessThenRefresh,
}

/// One backend call within a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `POST /ingest/mock`.
    IngestMock,
    /// `POST /ingest/process`.
    RunProcessing,
    /// `GET /emails`.
    FetchInbox,
}

/// What happens to the remaining steps when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Skip the rest.
    Abort,
    /// Run the rest anyway; the failure is still reported.
    Continue,
}

impl Flow {
    /// All flows.
    pub const ALL: [Self; 2] = [Self::LoadMockThenRefresh, Self::ProcessThenRefresh];

    /// Steps in execution order.
    ///
    /// A failed processing run is still followed by a refresh.
    #[must_use]
    pub const fn plan(self) -> &'static [(Step, OnFailure)] {
        match self {
            Self::LoadMockThenRefresh => &[
                (Step::IngestMock, OnFailure::Abort),
                (Step::FetchInbox, OnFailure::Abort),
            ],
            Self::ProcessThenRefresh => &[
                (Step::RunProcessing, OnFailure::Continue),
                (Step::FetchInbox, OnFailure::Abort),
            ],
        }
    }

    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoadMockThenRefresh => "Load Mock Inbox",
            Self::ProcessThenRefresh => "Run Agent Processing",
        }
    }
}

/// How a step ended.
#[derive(Debug)]
pub enum StepOutcome {
    /// The call succeeded.
    Succeeded,
    /// The call failed.
    Failed(Error),
    /// Not run because an earlier step aborted the flow.
    Skipped,
}

/// One step and how it ended.
#[derive(Debug)]
pub struct StepRecord {
    /// The step.
    pub step: Step,
    /// Its outcome.
    pub outcome: StepOutcome,
}

/// Result of one flow run.
#[derive(Debug)]
pub struct FlowReport {
    /// The flow that ran.
    pub flow: Flow,
    /// Every planned step, in order.
    pub steps: Vec<StepRecord>,
}

impl FlowReport {
    /// Whether every step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.steps
            .iter()
            .all(|r| matches!(r.outcome, StepOutcome::Succeeded))
    }

    /// Outcome of a step, if it is part of the plan.
    #[must_use]
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    /// The first failure.
    #[must_use]
    pub fn first_error(&self) -> Option<&Error> {
        self.steps.iter().find_map(|r| match &r.outcome {
            StepOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// Converts into the first failure, if any.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed step.
    pub fn into_result(self) -> Result<()> {
        self.steps
            .into_iter()
            .find_map(|r| match r.outcome {
                StepOutcome::Failed(e) => Some(e),
                _ => None,
            })
            .map_or(Ok(()), Err)
    }
}

/// Runs flows against an inbox, at most one run per flow at a time.
///
/// Cloning is cheap; clones share busy flags.
#[derive(Debug)]
pub struct Orchestrator<T> {
    inbox: InboxStore<T>,
    load_mock: BusyFlag,
    process: BusyFlag,
    errors: Arc<Mutex<HashMap<Flow, String>>>,
}

impl<T> Clone for Orchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            inbox: self.inbox.clone(),
            load_mock: self.load_mock.clone(),
            process: self.process.clone(),
            errors: Arc::clone(&self.errors),
        }
    }
}

impl<T: Transport> Orchestrator<T> {
    /// Creates an orchestrator over the inbox.
    #[must_use]
    pub fn new(inbox: InboxStore<T>) -> Self {
        Self {
            inbox,
            load_mock: BusyFlag::new(),
            process: BusyFlag::new(),
            errors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    const fn flag(&self, flow: Flow) -> &BusyFlag {
        match flow {
            Flow::LoadMockThenRefresh => &self.load_mock,
            Flow::ProcessThenRefresh => &self.process,
        }
    }

    /// Whether the flow is running.
    #[must_use]
    pub fn is_busy(&self, flow: Flow) -> bool {
        self.flag(flow).is_busy()
    }

    /// Whether any flow is running.
    #[must_use]
    pub fn any_busy(&self) -> bool {
        Flow::ALL.iter().any(|&flow| self.is_busy(flow))
    }

    /// First failure of the flow's last run, until the next run starts.
    #[must_use]
    pub fn last_error(&self, flow: Flow) -> Option<String> {
        lock(&self.errors).get(&flow).cloned()
    }

    /// Starts the flow.
    ///
    /// Returns `None` without side effects if the flow is already running.
    /// Otherwise the busy flag and the inbox loading indicator are set before
    /// this returns and cleared when the returned future completes or is
    /// dropped.
    pub fn run(&self, flow: Flow) -> Option<impl Future<Output = FlowReport> + Send + use<T>> {
        let Some(busy) = self.flag(flow).try_acquire() else {
            info!(?flow, "flow already running, ignoring");
            return None;
        };
        let loading = self.inbox.hold_loading();
        lock(&self.errors).remove(&flow);
        let inbox = self.inbox.clone();
        let errors = Arc::clone(&self.errors);
        info!(?flow, "flow started");

        Some(async move {
            let _busy = busy;
            let _loading = loading;

            let mut steps = Vec::with_capacity(flow.plan().len());
            let mut aborted = false;
            for &(step, on_failure) in flow.plan() {
                if aborted {
                    steps.push(StepRecord {
                        step,
                        outcome: StepOutcome::Skipped,
                    });
                    continue;
                }
                let outcome = match execute(&inbox, step).await {
                    Ok(()) => StepOutcome::Succeeded,
                    Err(e) => {
                        warn!(?flow, ?step, "step failed: {e}");
                        aborted = on_failure == OnFailure::Abort;
                        StepOutcome::Failed(e)
                    }
                };
                steps.push(StepRecord { step, outcome });
            }

            let report = FlowReport { flow, steps };
            if let Some(e) = report.first_error() {
                lock(&errors).insert(flow, e.to_string());
            } else {
                info!(?flow, "flow finished");
            }
            report
        })
    }

    /// Starts [`Flow::LoadMockThenRefresh`].
    pub fn load_mock_then_refresh(
        &self,
    ) -> Option<impl Future<Output = FlowReport> + Send + use<T>> {
        self.run(Flow::LoadMockThenRefresh)
    }

    /// Starts [`Flow::ProcessThenRefresh`].
    pub fn process_then_refresh(&self) -> Option<impl Future<Output = FlowReport> + Send + use<T>> {
        self.run(Flow::ProcessThenRefresh)
    }
}

async fn execute<T: Transport>(inbox: &InboxStore<T>, step: Step) -> Result<()> {
    match step {
        Step::IngestMock => inbox.ingest_mock().await.map(drop),
        Step::RunProcessing => inbox.run_processing().await.map(drop),
        Step::FetchInbox => inbox.fetch_all().await.map(drop),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, email};
    use oceandesk_api::{Api, Method};
    use serde_json::json;
    use tokio_test::{assert_pending, assert_ready, task};

    fn orchestrator(
        transport: &Arc<ScriptedTransport>,
    ) -> (Orchestrator<ScriptedTransport>, InboxStore<ScriptedTransport>) {
        let inbox = InboxStore::new(Api::from_shared(Arc::clone(transport)));
        (Orchestrator::new(inbox.clone()), inbox)
    }

    #[test]
    fn test_second_invocation_while_busy_is_a_no_op() {
        let transport = ScriptedTransport::shared();
        let gate = transport.gate(Method::Post, "/ingest/mock");
        transport.reply(Method::Get, "/emails", json!([email(1, "Important")]));
        let (orchestrator, inbox) = orchestrator(&transport);

        let mut run = task::spawn(orchestrator.load_mock_then_refresh().unwrap());
        assert!(orchestrator.is_busy(Flow::LoadMockThenRefresh));
        assert!(inbox.is_loading());
        assert_pending!(run.poll());

        assert!(orchestrator.load_mock_then_refresh().is_none());
        assert!(!orchestrator.is_busy(Flow::ProcessThenRefresh));

        gate.send(Ok(json!({ "message": "ok" }))).unwrap();
        let report = assert_ready!(run.poll());
        assert!(report.is_success());
        assert_eq!(transport.calls(Method::Post, "/ingest/mock"), 1);
        assert!(!orchestrator.is_busy(Flow::LoadMockThenRefresh));
        assert!(!inbox.is_loading());
        assert!(orchestrator.load_mock_then_refresh().is_some());
    }

    #[test]
    fn test_loading_spans_both_steps() {
        let transport = ScriptedTransport::shared();
        transport.reply(Method::Post, "/ingest/mock", json!({}));
        let fetch = transport.gate(Method::Get, "/emails");
        let (orchestrator, inbox) = orchestrator(&transport);

        let mut run = task::spawn(orchestrator.load_mock_then_refresh().unwrap());
        assert_pending!(run.poll());
        // Ingestion is done; only the fetch is outstanding.
        assert_eq!(transport.calls(Method::Post, "/ingest/mock"), 1);
        assert!(inbox.is_loading());

        fetch.send(Ok(json!([email(1, "Spam")]))).unwrap();
        assert_ready!(run.poll());
        assert!(!inbox.is_loading());
        assert_eq!(inbox.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_ingest_aborts_refresh() {
        let transport = ScriptedTransport::shared();
        transport.fail(Method::Post, "/ingest/mock", 500);
        let (orchestrator, inbox) = orchestrator(&transport);

        let report = orchestrator.load_mock_then_refresh().unwrap().await;

        assert!(matches!(
            report.outcome(Step::IngestMock),
            Some(StepOutcome::Failed(_))
        ));
        assert!(matches!(
            report.outcome(Step::FetchInbox),
            Some(StepOutcome::Skipped)
        ));
        assert_eq!(transport.calls(Method::Get, "/emails"), 0);
        assert!(orchestrator.last_error(Flow::LoadMockThenRefresh).is_some());
        assert!(!orchestrator.is_busy(Flow::LoadMockThenRefresh));
        assert!(!inbox.is_loading());
    }

    #[tokio::test]
    async fn test_failed_ingest_leaves_loaded_inbox_untouched() {
        let transport = ScriptedTransport::shared();
        transport.reply(
            Method::Get,
            "/emails",
            json!([email(1, "Important"), email(2, "Newsletter")]),
        );
        transport.fail(Method::Post, "/ingest/mock", 503);
        let (orchestrator, inbox) = orchestrator(&transport);
        inbox.fetch_all().await.unwrap();
        let before = inbox.emails();

        let report = orchestrator.load_mock_then_refresh().unwrap().await;

        assert!(!report.is_success());
        assert_eq!(inbox.emails(), before);
        assert_eq!(inbox.len(), 2);
        assert_eq!(transport.calls(Method::Get, "/emails"), 1);
        assert!(!inbox.is_loading());
    }

    #[tokio::test]
    async fn test_failed_processing_still_refreshes_and_reports() {
        let transport = ScriptedTransport::shared();
        transport.fail(Method::Post, "/ingest/process", 500);
        transport.reply(Method::Get, "/emails", json!([email(1, "To-Do")]));
        let (orchestrator, inbox) = orchestrator(&transport);

        let report = orchestrator.process_then_refresh().unwrap().await;

        assert!(!report.is_success());
        assert!(matches!(
            report.outcome(Step::FetchInbox),
            Some(StepOutcome::Succeeded)
        ));
        assert_eq!(inbox.len(), 1);
        assert!(orchestrator.last_error(Flow::ProcessThenRefresh).is_some());
        assert!(report.into_result().is_err());
    }

    #[tokio::test]
    async fn test_new_run_clears_previous_error() {
        let transport = ScriptedTransport::shared();
        transport.fail(Method::Post, "/ingest/process", 500);
        transport.reply(Method::Get, "/emails", json!([]));
        transport.reply(Method::Post, "/ingest/process", json!({ "processed": 3 }));
        transport.reply(Method::Get, "/emails", json!([]));
        let (orchestrator, _inbox) = orchestrator(&transport);

        orchestrator.process_then_refresh().unwrap().await;
        assert!(orchestrator.last_error(Flow::ProcessThenRefresh).is_some());

        let report = orchestrator.process_then_refresh().unwrap().await;
        assert!(report.is_success());
        assert_eq!(orchestrator.last_error(Flow::ProcessThenRefresh), None);
    }

    #[test]
    fn test_dropped_flow_releases_flags() {
        let transport = ScriptedTransport::shared();
        let _gate = transport.gate(Method::Post, "/ingest/process");
        let (orchestrator, inbox) = orchestrator(&transport);

        let mut run = task::spawn(orchestrator.process_then_refresh().unwrap());
        assert_pending!(run.poll());
        drop(run);

        assert!(!orchestrator.any_busy());
        assert!(!inbox.is_loading());
    }
}
