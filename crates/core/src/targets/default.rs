use crate::execution::target::Target;
use crate::targets::{keys, DevGraph};
use crate::types::DevResult;

pub fn register(graph: &mut DevGraph) -> DevResult<()> {
    graph.register(
        Target::new(keys::DEFAULT)
            .description("Runs the build when no target is named.")
            .depends_on([keys::BUILD]),
    )
}
