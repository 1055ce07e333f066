use crate::artifacts;
use crate::execution::target::Target;
use crate::targets::{keys, DevGraph, ProjectLayout, TargetContext};
use crate::toolchain::dotnet;
use crate::types::DevResult;

pub fn register(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    let solution_filter = artifacts::solution_filter(&layout.solution_name);

    graph.register(
        Target::new(keys::CLEAN)
            .description("Cleans .NET build artifacts from prior executions.")
            .depends_on([keys::SOLUTION])
            .action(move |context: &TargetContext| {
                context.commands.run(&dotnet::command(
                    &context.settings,
                    "clean",
                    Some(&solution_filter),
                ))
            }),
    )
}
