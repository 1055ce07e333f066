use std::fmt;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{DevError, DevResult};

/// Location of the project configuration, relative to the workspace root
pub const DEFAULT_CONFIG_PATH: &str = ".dev/config.yml";

const DEFAULT_LINT_IMAGE: &str = "oxsecurity/megalinter-dotnet:v8";
const DEFAULT_EXCLUDED_PROJECT: &str = "Dev";

/// Project layout the stock targets operate on
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DevConfig {
    /// Solution name; defaults to the workspace directory name
    pub solution_name: Option<String>,
    /// Title of the coverage report; defaults to the solution name
    pub title: Option<String>,
    /// Project file stems left out of the generated solution filter
    #[serde(default = "default_excluded_projects")]
    pub exclude_projects: Vec<String>,
    /// One fan-out target per suite, aggregated under `test`
    #[serde(default = "default_test_suites")]
    pub test_suites: Vec<TestSuiteConfig>,
    /// Projects published as executables by the `publish` target
    #[serde(default)]
    pub publish: Vec<PublishProjectConfig>,
    /// Container image used by the `lint` target
    #[serde(default = "default_lint_image")]
    pub lint_image: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestSuiteConfig {
    pub name: String,
    pub description: Option<String>,
    pub projects: Vec<TestProjectConfig>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestProjectConfig {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PublishProjectConfig {
    pub name: String,
    pub path: String,
    pub runtimes: Vec<String>,
}

impl fmt::Display for TestProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for PublishProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl DevConfig {
    pub fn solution_name(&self, workspace_root: &Path) -> String {
        self.solution_name.clone().unwrap_or_else(|| {
            workspace_root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Solution".to_string())
        })
    }

    pub fn report_title(&self, workspace_root: &Path) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| self.solution_name(workspace_root))
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            solution_name: None,
            title: None,
            exclude_projects: default_excluded_projects(),
            test_suites: default_test_suites(),
            publish: Vec::new(),
            lint_image: default_lint_image(),
        }
    }
}

fn default_excluded_projects() -> Vec<String> {
    vec![DEFAULT_EXCLUDED_PROJECT.to_string()]
}

fn default_lint_image() -> String {
    DEFAULT_LINT_IMAGE.to_string()
}

fn default_test_suites() -> Vec<TestSuiteConfig> {
    vec![
        TestSuiteConfig {
            name: "test.integration".to_string(),
            description: Some(
                "Tests integrations between components of the application.".to_string(),
            ),
            projects: vec![TestProjectConfig {
                name: "integration".to_string(),
                path: "tests/IntegrationTests".to_string(),
            }],
        },
        TestSuiteConfig {
            name: "test.unit".to_string(),
            description: Some("Tests individual components of the application.".to_string()),
            projects: vec![TestProjectConfig {
                name: "domain".to_string(),
                path: "tests/Domain.Facts".to_string(),
            }],
        },
    ]
}

pub fn parse_dev_config(yaml_str: &str) -> DevResult<DevConfig> {
    if yaml_str.trim().is_empty() {
        return Ok(DevConfig::default());
    }

    let config: DevConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

/// Load the configuration at `path`, falling back to defaults when the file
/// does not exist
pub fn load_dev_config(path: &Path) -> DevResult<DevConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no project config, using defaults");
        return Ok(DevConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        DevError::Config(format!("Failed to read config {}: {}", path.display(), e))
    })?;

    parse_dev_config(&content).map_err(|e| {
        DevError::Config(format!("Failed to parse config {}: {}", path.display(), e))
    })
}

/// JSON schema of the project configuration file
pub fn config_schema() -> DevResult<String> {
    let schema = schemars::schema_for!(DevConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
