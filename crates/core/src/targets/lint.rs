use std::fs;
use std::path::Path;

use crate::artifacts;
use crate::execution::command::CommandSpec;
use crate::execution::target::Target;
use crate::targets::{keys, DevGraph, ProjectLayout, TargetContext};
use crate::types::DevResult;

/// Report directory the linter leaves in the mounted workspace
pub const REPORTS_DIR: &str = "megalinter-reports";

const MOUNT_POINT: &str = "/tmp/lint";

pub fn register(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    let image = layout.lint_image.clone();

    graph.register(
        Target::new(keys::LINT)
            .description("Flags stylistic and functional issues using static code analysis tools.")
            .action(move |context: &TargetContext| {
                context.commands.run(&lint_command(context, &image))?;
                collect_reports(&context.root)
            }),
    )
}

fn lint_command(context: &TargetContext, image: &str) -> CommandSpec {
    let mut command = CommandSpec::new(context.settings.container_runtime.as_str()).args([
        "run".to_string(),
        "--rm".to_string(),
        "--volume".to_string(),
        format!("{}:{}:rw", context.root.display(), MOUNT_POINT),
    ]);
    if context.settings.local_lint {
        command = command.args(["--env", "APPLY_FIXES=all"]);
    }
    command.arg(image)
}

/// Replace `artifacts/linting` with the reports of the latest run
fn collect_reports(root: &Path) -> DevResult<()> {
    let results = root.join(artifacts::LINT_RESULTS);
    if results.exists() {
        fs::remove_dir_all(&results)?;
    }
    fs::create_dir_all(root.join(artifacts::ROOT))?;
    fs::rename(root.join(REPORTS_DIR), &results)?;

    tracing::debug!(path = %results.display(), "collected lint reports");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::execution::testing::RecordingCommandRunner;
    use crate::settings::DevSettings;
    use crate::targets::test_support::{context, layout, run_only};
    use crate::types::DevError;

    fn write_report(root: &Path, name: &str) {
        fs::create_dir_all(root.join(REPORTS_DIR)).unwrap();
        fs::write(root.join(REPORTS_DIR).join(name), "ok").unwrap();
    }

    #[tokio::test]
    async fn mounts_the_workspace_and_moves_reports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_report(root, "megalinter.log");
        let recorder = Arc::new(RecordingCommandRunner::new());
        let context = context(root, DevSettings::default(), &recorder);

        run_only(&layout(), context, &["lint"]).await.unwrap();

        assert_eq!(
            recorder.command_lines(),
            vec![format!(
                "podman run --rm --volume {}:/tmp/lint:rw oxsecurity/megalinter-dotnet:v8",
                root.display()
            )]
        );
        assert!(root.join("artifacts/linting/megalinter.log").is_file());
        assert!(!root.join(REPORTS_DIR).exists());
    }

    #[tokio::test]
    async fn local_lint_applies_fixes_and_replaces_old_results() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("artifacts/linting")).unwrap();
        fs::write(root.join("artifacts/linting/stale.log"), "old").unwrap();
        write_report(root, "fresh.log");

        let settings = DevSettings {
            container_runtime: "docker".to_string(),
            local_lint: true,
            ..DevSettings::default()
        };
        let recorder = Arc::new(RecordingCommandRunner::new());
        let context = context(root, settings, &recorder);

        run_only(&layout(), context, &["lint"]).await.unwrap();

        let commands = recorder.commands();
        assert_eq!(commands[0].program(), "docker");
        assert!(commands[0]
            .arguments()
            .windows(2)
            .any(|pair| pair == ["--env", "APPLY_FIXES=all"]));
        assert!(root.join("artifacts/linting/fresh.log").is_file());
        assert!(!root.join("artifacts/linting/stale.log").exists());
    }

    #[tokio::test]
    async fn linter_failure_leaves_previous_results_alone() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("artifacts/linting")).unwrap();
        let recorder = Arc::new(RecordingCommandRunner::new().failing_on("--rm"));
        let context = context(root, DevSettings::default(), &recorder);

        let err = run_only(&layout(), context, &["lint"]).await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            DevError::ExternalCommand { code: Some(1), .. }
        ));
        assert!(root.join("artifacts/linting").is_dir());
    }
}
