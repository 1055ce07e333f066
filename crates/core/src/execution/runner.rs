//! High-level target runner
//!
//! This module executes a resolved [`ExecutionPlan`] against a context, one
//! target at a time. Actions are blocking, so each one runs on tokio's
//! blocking pool; fan-out items may share a bounded number of permits.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::display;
use crate::execution::graph::TargetGraph;
use crate::execution::plan::ExecutionPlan;
use crate::execution::target::{Target, TargetAction, WorkItem};
use crate::results::{RunSummary, TargetTiming};
use crate::types::{DevError, DevResult};

/// Configuration for the target runner
#[derive(Debug, Clone)]
pub struct TargetRunnerConfig {
    /// Upper bound on fan-out items running at once; 1 runs them in order
    pub parallelism: usize,
    /// Print target headers and completion markers
    pub report_progress: bool,
}

impl Default for TargetRunnerConfig {
    fn default() -> Self {
        Self {
            parallelism: 1,
            report_progress: true,
        }
    }
}

/// Executes plans built from a shared [`TargetGraph`]
pub struct TargetRunner<C> {
    graph: Arc<TargetGraph<C>>,
    config: TargetRunnerConfig,
}

impl<C: Send + Sync + 'static> TargetRunner<C> {
    pub fn new(graph: Arc<TargetGraph<C>>) -> Self {
        Self::with_config(graph, TargetRunnerConfig::default())
    }

    pub fn with_config(graph: Arc<TargetGraph<C>>, config: TargetRunnerConfig) -> Self {
        Self { graph, config }
    }

    /// Run every target of `plan` in order, stopping at the first failure.
    /// Targets that finished before the failure stay finished.
    pub async fn run(&self, plan: &ExecutionPlan, context: Arc<C>) -> DevResult<RunSummary> {
        let started = Instant::now();
        let mut completed = HashSet::new();
        let mut timings = Vec::new();

        for step in plan.steps() {
            if !completed.insert(step.name.as_str()) {
                tracing::debug!(target_name = %step.name, "already completed, skipping");
                continue;
            }

            let target = self.graph.get(&step.name).ok_or_else(|| DevError::UnknownTarget {
                name: step.name.clone(),
                required_by: None,
            })?;

            let target_started = Instant::now();
            if self.config.report_progress {
                display::print_target_header(target.name(), target.description_text());
            }

            if let Err(err) = self.run_target(target, &context).await {
                if self.config.report_progress {
                    display::print_target_failed(target.name());
                }
                return Err(err);
            }

            let elapsed = target_started.elapsed();
            tracing::debug!(target_name = target.name(), ?elapsed, "target completed");
            if self.config.report_progress {
                display::print_target_completed(target.name(), elapsed);
            }
            timings.push(TargetTiming {
                name: target.name().to_string(),
                items: target.item_labels().len(),
                duration: elapsed,
            });
        }

        Ok(RunSummary {
            targets: timings,
            duration: started.elapsed(),
        })
    }

    async fn run_target(&self, target: &Target<C>, context: &Arc<C>) -> DevResult<()> {
        match target.target_action() {
            TargetAction::None => Ok(()),
            TargetAction::Simple(_) => self.run_blocking(target.name(), None, context).await,
            TargetAction::FanOut(items) if self.config.parallelism > 1 && items.len() > 1 => {
                self.run_items_concurrently(target.name(), items, context)
                    .await
            }
            TargetAction::FanOut(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.report_item(target.name(), item);
                    self.run_blocking(target.name(), Some(index), context)
                        .await?;
                }
                Ok(())
            }
        }
    }

    async fn run_blocking(
        &self,
        target: &str,
        item: Option<usize>,
        context: &Arc<C>,
    ) -> DevResult<()> {
        let graph = Arc::clone(&self.graph);
        let context = Arc::clone(context);
        let target = target.to_string();
        tokio::task::spawn_blocking(move || run_unit(&graph, &target, item, &context)).await?
    }

    /// Start items in order while permits are available. A failure stops
    /// items that have not started yet; started ones are awaited.
    async fn run_items_concurrently(
        &self,
        target: &str,
        items: &[WorkItem<C>],
        context: &Arc<C>,
    ) -> DevResult<()> {
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut join_set = JoinSet::new();

        tracing::debug!(
            target_name = target,
            permits = self.config.parallelism,
            items = items.len(),
            "running items concurrently"
        );
        for (index, item) in items.iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|err| DevError::WorkerPool(err.to_string()))?;
            if cancelled.load(Ordering::SeqCst) {
                tracing::debug!(target_name = target, item = item.label(), "not started after failure");
                break;
            }
            self.report_item(target, item);

            let graph = Arc::clone(&self.graph);
            let context = Arc::clone(context);
            let cancelled = Arc::clone(&cancelled);
            let target = target.to_string();
            join_set.spawn_blocking(move || {
                let result = run_unit(&graph, &target, Some(index), &context);
                if result.is_err() {
                    cancelled.store(true, Ordering::SeqCst);
                }
                drop(permit);
                result
            });
        }

        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            if let Err(err) = joined.map_err(DevError::from).and_then(|result| result) {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn report_item(&self, target: &str, item: &WorkItem<C>) {
        if self.config.report_progress {
            display::print_item_header(target, item.label());
        }
    }
}

/// Run a target's action, or one of its items, and attribute any failure
fn run_unit<C>(
    graph: &TargetGraph<C>,
    target: &str,
    item: Option<usize>,
    context: &C,
) -> DevResult<()> {
    let found = graph.get(target).ok_or_else(|| DevError::UnknownTarget {
        name: target.to_string(),
        required_by: None,
    })?;

    match (found.target_action(), item) {
        (TargetAction::Simple(action), None) => {
            action(context).map_err(|err| DevError::target_failed(target, None, err))
        }
        (TargetAction::FanOut(items), Some(index)) => {
            let work_item = items.get(index).ok_or_else(|| {
                DevError::WorkerPool(format!("Target '{}' has no item #{}", target, index))
            })?;
            work_item
                .run(context)
                .map_err(|err| DevError::target_failed(target, Some(work_item.label()), err))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Recorder {
        fn record(&self, event: impl Into<String>) {
            self.events.lock().unwrap().push(event.into());
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        /// Hold a slot for `duration`, tracking the highest overlap seen
        fn occupy(&self, duration: Duration) {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(duration);
            self.running.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn quiet(parallelism: usize) -> TargetRunnerConfig {
        TargetRunnerConfig {
            parallelism,
            report_progress: false,
        }
    }

    fn simple(name: &'static str) -> Target<Recorder> {
        Target::new(name).action(move |recorder: &Recorder| {
            recorder.record(name);
            Ok(())
        })
    }

    fn failure() -> DevError {
        DevError::ExternalCommand {
            program: "dotnet".to_string(),
            args: vec!["test".to_string()],
            code: Some(1),
        }
    }

    fn fan_out(name: &'static str, items: &[&'static str], failing: Option<&'static str>) -> Target<Recorder> {
        Target::new(name).for_each(items.to_vec(), move |recorder: &Recorder, item: &&str| {
            recorder.record(format!("{}({})", name, item));
            if failing == Some(*item) {
                return Err(failure());
            }
            Ok(())
        })
    }

    fn item_names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("i{}", i)).collect()
    }

    async fn run(
        graph: TargetGraph<Recorder>,
        requested: &[&str],
        parallelism: usize,
    ) -> (Arc<Recorder>, DevResult<RunSummary>) {
        let requested: Vec<String> = requested.iter().map(|s| s.to_string()).collect();
        let plan = graph.resolve(&requested).unwrap();
        let recorder = Arc::new(Recorder::default());
        let result = TargetRunner::with_config(Arc::new(graph), quiet(parallelism))
            .run(&plan, Arc::clone(&recorder))
            .await;
        (recorder, result)
    }

    #[tokio::test]
    async fn aggregate_target_succeeds_and_is_recorded() {
        let mut graph = TargetGraph::new();
        graph.register(simple("build")).unwrap();
        graph
            .register(Target::new("default").depends_on(["build"]))
            .unwrap();

        let (recorder, result) = run(graph, &[], 1).await;

        assert_eq!(recorder.events(), vec!["build"]);
        assert_eq!(result.unwrap().names(), vec!["build", "default"]);
    }

    #[tokio::test]
    async fn fan_out_runs_every_item_before_dependents() {
        let mut graph = TargetGraph::new();
        graph.register(fan_out("publish", &["x", "y", "z"], None)).unwrap();
        graph
            .register(simple("release").depends_on(["publish"]))
            .unwrap();

        let (recorder, result) = run(graph, &["release"], 1).await;

        result.unwrap();
        assert_eq!(
            recorder.events(),
            vec!["publish(x)", "publish(y)", "publish(z)", "release"]
        );
    }

    #[tokio::test]
    async fn fan_out_failure_names_target_and_item_and_stops_dependents() {
        let mut graph = TargetGraph::new();
        graph
            .register(fan_out("publish", &["x", "y", "z"], Some("y")))
            .unwrap();
        graph
            .register(simple("release").depends_on(["publish"]))
            .unwrap();

        let (recorder, result) = run(graph, &["release"], 1).await;

        assert_eq!(recorder.events(), vec!["publish(x)", "publish(y)"]);
        match result.unwrap_err() {
            DevError::TargetFailed { target, item, .. } => {
                assert_eq!(target, "publish");
                assert_eq!(item.as_deref(), Some("y"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn simple_failure_is_wrapped_with_target_name() {
        let mut graph = TargetGraph::new();
        graph
            .register(Target::new("lint").action(|_: &Recorder| Err(failure())))
            .unwrap();

        let (_, result) = run(graph, &["lint"], 1).await;

        assert!(matches!(
            result.unwrap_err(),
            DevError::TargetFailed { ref target, item: None, .. } if target == "lint"
        ));
    }

    #[tokio::test]
    async fn duplicate_plan_entries_run_once() {
        let mut graph = TargetGraph::new();
        graph.register(simple("clean")).unwrap();

        let plan = graph
            .resolve_without_dependencies(&["clean".to_string()])
            .unwrap();
        let doubled = ExecutionPlan::new([plan.steps(), plan.steps()].concat());

        let recorder = Arc::new(Recorder::default());
        TargetRunner::with_config(Arc::new(graph), quiet(1))
            .run(&doubled, Arc::clone(&recorder))
            .await
            .unwrap();
        assert_eq!(recorder.events(), vec!["clean"]);
    }

    #[tokio::test]
    async fn concurrent_items_all_finish_before_dependents() {
        let mut graph = TargetGraph::new();
        graph
            .register(fan_out("test.unit", &["a", "b", "c", "d", "e"], None))
            .unwrap();
        graph
            .register(simple("test").depends_on(["test.unit"]))
            .unwrap();

        let (recorder, result) = run(graph, &["test"], 3).await;

        result.unwrap();
        let events = recorder.events();
        assert_eq!(events.len(), 6);
        assert_eq!(events.last().map(String::as_str), Some("test"));
        let mut items = events[..5].to_vec();
        items.sort();
        assert_eq!(
            items,
            vec!["test.unit(a)", "test.unit(b)", "test.unit(c)", "test.unit(d)", "test.unit(e)"]
        );
    }

    #[tokio::test]
    async fn concurrent_items_never_exceed_the_permit_count() {
        let mut graph = TargetGraph::new();
        graph
            .register(Target::new("publish").for_each(item_names(9), |recorder: &Recorder, item: &String| {
                recorder.occupy(Duration::from_millis(20));
                recorder.record(item.clone());
                Ok(())
            }))
            .unwrap();

        let (recorder, result) = run(graph, &["publish"], 3).await;

        result.unwrap();
        assert_eq!(recorder.events().len(), 9);
        let peak = recorder.peak.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak overlap was {peak}");
    }

    #[tokio::test]
    async fn concurrent_failure_cancels_and_skips_dependents() {
        let mut graph = TargetGraph::new();
        graph
            .register(fan_out("test.unit", &["a", "b", "c", "d"], Some("b")))
            .unwrap();
        graph
            .register(simple("test").depends_on(["test.unit"]))
            .unwrap();

        let (recorder, result) = run(graph, &["test"], 2).await;

        assert!(!recorder.events().contains(&"test".to_string()));
        assert!(matches!(
            result.unwrap_err(),
            DevError::TargetFailed { ref target, item: Some(ref item), .. }
                if target == "test.unit" && item == "b"
        ));
    }

    #[tokio::test]
    async fn early_failure_keeps_later_items_from_starting() {
        let mut graph = TargetGraph::new();
        graph
            .register(Target::new("test.unit").for_each(item_names(20), |recorder: &Recorder, item: &String| {
                recorder.record(item.clone());
                if item == "i0" {
                    return Err(failure());
                }
                // outlast the failing item so its permit is released first
                recorder.occupy(Duration::from_millis(200));
                Ok(())
            }))
            .unwrap();

        let (recorder, result) = run(graph, &["test.unit"], 2).await;

        let mut started = recorder.events();
        started.sort();
        assert_eq!(started, vec!["i0", "i1"]);
        assert!(matches!(
            result.unwrap_err(),
            DevError::TargetFailed { item: Some(ref item), .. } if item == "i0"
        ));
    }

    #[tokio::test]
    async fn end_to_end_order_and_failure() {
        fn build_graph(failing: Option<&'static str>) -> TargetGraph<Recorder> {
            let mut graph = TargetGraph::new();
            graph.register(simple("clean")).unwrap();
            graph
                .register(simple("build").depends_on(["clean"]))
                .unwrap();
            graph
                .register(fan_out("test.unit", &["p1", "p2"], failing).depends_on(["build"]))
                .unwrap();
            graph
                .register(simple("test").depends_on(["test.unit"]))
                .unwrap();
            graph
        }

        let graph = build_graph(None);
        let units = graph.resolve(&["test".to_string()]).unwrap().units();
        assert_eq!(
            units,
            vec!["clean", "build", "test.unit(p1)", "test.unit(p2)", "test"]
        );
        let (recorder, result) = run(graph, &["test"], 1).await;
        result.unwrap();
        assert_eq!(recorder.events(), units);

        let (recorder, result) = run(build_graph(Some("p1")), &["test"], 1).await;
        let err = result.unwrap_err();

        assert_eq!(recorder.events(), vec!["clean", "build", "test.unit(p1)"]);
        match &err {
            DevError::TargetFailed { target, item, .. } => {
                assert_eq!(target, "test.unit");
                assert_eq!(item.as_deref(), Some("p1"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root_cause(), DevError::ExternalCommand { .. }));
    }
}
