use crate::artifacts;
use crate::execution::command::CommandSpec;
use crate::execution::target::Target;
use crate::targets::{keys, DevGraph, ProjectLayout, TargetContext};
use crate::toolchain::{dotnet, git};
use crate::types::DevResult;

/// Assembly name suffixes left out of the coverage report
const EXCLUDED_ASSEMBLY_SUFFIXES: [&str; 4] = ["Dev", "Facts", "Testbed", "Tests"];

pub fn register(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    let assembly_filters = assembly_filters(&layout.solution_name);
    let title = layout.report_title.clone();

    graph.register(
        Target::new(keys::COVERAGE)
            .description("Generates a code coverage report from test results.")
            .depends_on([keys::TEST])
            .action(move |context: &TargetContext| {
                let commit_id = git::commit_id(context.commands.as_ref())?;
                let command = CommandSpec::new(dotnet::PROGRAM).args([
                    "reportgenerator".to_string(),
                    format!("-assemblyFilters:{}", assembly_filters),
                    format!("-reports:{}", artifacts::TEST_RESULTS_COVERAGE_GLOB),
                    format!("-targetdir:{}", artifacts::TEST_COVERAGE),
                    format!("-tag:{}", commit_id),
                    "-reporttypes:Html".to_string(),
                    format!("-title:{}", title),
                ]);
                context.commands.run(&command)
            }),
    )
}

/// `+<solution>.**` followed by one exclusion per test/tooling suffix
fn assembly_filters(solution_name: &str) -> String {
    std::iter::once(format!("+{}.**", solution_name))
        .chain(
            EXCLUDED_ASSEMBLY_SUFFIXES
                .iter()
                .map(|suffix| format!("-{}.**{}", solution_name, suffix)),
        )
        .collect::<Vec<_>>()
        .join(",")
}
