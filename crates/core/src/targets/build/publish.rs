use crate::artifacts;
use crate::configs::project::PublishProjectConfig;
use crate::execution::target::Target;
use crate::targets::{keys, DevGraph, ProjectLayout, TargetContext};
use crate::toolchain::dotnet;
use crate::types::DevResult;

pub fn register(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    graph.register(
        Target::new(keys::PUBLISH)
            .description("Publishes projects as executables for release.")
            .depends_on([keys::DOTNET])
            .for_each(layout.publish.clone(), publish_project),
    )
}

/// Publish `project` once per runtime, stopping at the first failure
fn publish_project(context: &TargetContext, project: &PublishProjectConfig) -> DevResult<()> {
    for runtime in &project.runtimes {
        let command = dotnet::command(&context.settings, "publish", Some(&project.path))
            .args(["--runtime", runtime.as_str()])
            .arg("--output")
            .arg(artifacts::executable_dir(&project.name, runtime))
            .label(format!("{}/{}", project.name, runtime));
        context.commands.run(&command)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use crate::configs::project::PublishProjectConfig;
    use crate::execution::testing::RecordingCommandRunner;
    use crate::settings::DevSettings;
    use crate::targets::test_support::{context, layout, run_only};

    #[tokio::test]
    async fn no_configured_projects_is_a_no_op() {
        let recorder = Arc::new(RecordingCommandRunner::new());
        let context = context(Path::new("."), DevSettings::default(), &recorder);

        run_only(&layout(), context, &["publish"]).await.unwrap();
        assert!(recorder.commands().is_empty());
    }

    #[tokio::test]
    async fn every_runtime_is_published_to_its_own_directory() {
        let mut layout = layout();
        layout.publish = vec![PublishProjectConfig {
            name: "cli".to_string(),
            path: "src/Acme.Cli".to_string(),
            runtimes: vec!["linux-x64".to_string(), "win-x64".to_string()],
        }];
        let recorder = Arc::new(RecordingCommandRunner::new());
        let context = context(Path::new("."), DevSettings::default(), &recorder);

        run_only(&layout, context, &["publish"]).await.unwrap();
        assert_eq!(
            recorder.command_lines(),
            vec![
                "dotnet publish src/Acme.Cli --configuration Release --verbosity minimal --nologo --runtime linux-x64 --output artifacts/executables/cli/linux-x64",
                "dotnet publish src/Acme.Cli --configuration Release --verbosity minimal --nologo --runtime win-x64 --output artifacts/executables/cli/win-x64",
            ]
        );
    }
}
