//! Build, test and release targets driven by the dotnet toolchain

pub mod clean;
pub mod coverage;
pub mod dotnet;
pub mod publish;
pub mod solution;

use crate::execution::target::Target;
use crate::targets::{keys, DevGraph, ProjectLayout};
use crate::types::DevResult;

pub fn register(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    solution::register(graph, layout)?;
    clean::register(graph, layout)?;
    dotnet::register(graph, layout)?;
    graph.register(
        Target::new(keys::BUILD)
            .description("Executes the complete build process.")
            .depends_on([keys::DOTNET]),
    )?;
    test::register(graph, layout)?;
    coverage::register(graph, layout)?;
    publish::register(graph, layout)?;
    Ok(())
}
