//! Solution filter generation
//!
//! The filter narrows the full solution down to the projects found in the
//! workspace, minus the projects listed in `excludeProjects`.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::artifacts;
use crate::execution::target::Target;
use crate::targets::{keys, DevGraph, ProjectLayout, TargetContext};
use crate::types::{DevError, DevResult};

/// Directory levels below the root searched for project files
const MAX_PROJECT_DEPTH: usize = 2;

const PROJECT_GLOB: &str = "*.csproj";
const SKIPPED_DIRECTORIES: &[&str] = &["**/.git", "**/bin", "**/obj", "**/node_modules", "artifacts"];

/// Contents of a `.slnf` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionFilter {
    pub solution: SolutionReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionReference {
    /// Solution file, relative to the filter file
    pub path: String,
    /// Member projects, relative to the solution file
    pub projects: Vec<String>,
}

impl SolutionFilter {
    pub fn new(solution_path: impl Into<String>, projects: Vec<String>) -> Self {
        Self {
            solution: SolutionReference {
                path: solution_path.into(),
                projects,
            },
        }
    }

    pub fn to_json(&self) -> DevResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> DevResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn register(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    let solution_name = layout.solution_name.clone();
    let excluded = layout.exclude_projects.clone();

    graph.register(
        Target::new(keys::SOLUTION)
            .description("Generates the solution filter used for the build process.")
            .action(move |context: &TargetContext| {
                write_solution_filter(&context.root, &solution_name, &excluded).map(|_| ())
            }),
    )
}

/// Write `artifacts/<solution_name>.slnf` and return its path
pub fn write_solution_filter(
    root: &Path,
    solution_name: &str,
    excluded: &[String],
) -> DevResult<PathBuf> {
    let projects = discover_projects(root, excluded)?;
    let filter = SolutionFilter::new(format!("../{}.slnx", solution_name), projects);

    let path = root.join(artifacts::solution_filter(solution_name));
    fs::create_dir_all(root.join(artifacts::ROOT))?;
    fs::write(&path, filter.to_json()?)?;

    tracing::debug!(
        path = %path.display(),
        projects = filter.solution.projects.len(),
        "wrote solution filter"
    );
    Ok(path)
}

/// Project files up to [`MAX_PROJECT_DEPTH`] levels deep, as sorted
/// `/`-separated paths relative to `root`
pub fn discover_projects(root: &Path, excluded: &[String]) -> DevResult<Vec<String>> {
    let project_glob = Glob::new(PROJECT_GLOB)
        .map_err(|e| DevError::Config(format!("Invalid project glob: {}", e)))?
        .compile_matcher();
    let skipped = skipped_directories()?;

    let mut projects = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back((root.to_path_buf(), 0));

    while let Some((current_dir, depth)) = queue.pop_front() {
        let mut entries = fs::read_dir(&current_dir)?
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let relative_path = path.strip_prefix(root).unwrap_or(&path);

            if path.is_dir() {
                if depth < MAX_PROJECT_DEPTH && !skipped.is_match(relative_path) {
                    queue.push_back((path, depth + 1));
                }
                continue;
            }

            let Some(file_name) = path.file_name() else {
                continue;
            };
            if !project_glob.is_match(file_name) {
                continue;
            }

            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            if excluded.iter().any(|name| *name == stem) {
                continue;
            }

            projects.push(to_slash_path(relative_path));
        }
    }

    projects.sort();
    Ok(projects)
}

fn skipped_directories() -> DevResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in SKIPPED_DIRECTORIES {
        let glob = Glob::new(pattern)
            .map_err(|e| DevError::Config(format!("Invalid glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DevError::Config(format!("Invalid directory globs: {}", e)))
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
