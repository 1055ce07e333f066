//! Artifact directory layout
//!
//! Every path is relative to the workspace root, which is also the working
//! directory of every external command.

pub const ROOT: &str = "artifacts";

pub const EXECUTABLES: &str = "artifacts/executables";

pub const LINT_RESULTS: &str = "artifacts/linting";

pub const TEST_COVERAGE: &str = "artifacts/tests/coverage";
pub const TEST_RESULTS: &str = "artifacts/tests/results";
pub const TEST_RESULTS_COVERAGE_GLOB: &str = "artifacts/tests/results/*/*/coverage.cobertura.xml";

pub fn solution_filter(solution_name: &str) -> String {
    format!("{}/{}.slnf", ROOT, solution_name)
}

pub fn executable_dir(project: &str, runtime: &str) -> String {
    format!("{}/{}/{}", EXECUTABLES, project, runtime)
}

pub fn test_results_dir(project: &str) -> String {
    format!("{}/{}", TEST_RESULTS, project)
}
