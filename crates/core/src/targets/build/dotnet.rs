use crate::artifacts;
use crate::execution::target::Target;
use crate::targets::{keys, DevGraph, ProjectLayout, TargetContext};
use crate::toolchain::dotnet;
use crate::types::DevResult;

pub fn register(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    let solution_filter = artifacts::solution_filter(&layout.solution_name);

    graph.register(
        Target::new(keys::DOTNET)
            .description("Builds the solution into output binaries.")
            .depends_on([keys::CLEAN])
            .action(move |context: &TargetContext| {
                let mut command =
                    dotnet::command(&context.settings, "build", Some(&solution_filter));
                if !context.settings.local_build {
                    command = command.arg("/warnaserror");
                }
                context.commands.run(&command)
            }),
    )
}
