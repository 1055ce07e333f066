use thiserror::Error;

/// The main error type for dev operations
#[derive(Debug, Error)]
pub enum DevError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Target '{0}' is already registered")]
    DuplicateTarget(String),

    #[error("Target '{name}' not found{}", describe_referrer(.required_by))]
    UnknownTarget {
        name: String,
        required_by: Option<String>,
    },

    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Failed to execute '{program}': {source}")]
    CommandSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Command '{}' {}", describe_command(.program, .args), describe_exit(.code))]
    ExternalCommand {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
    },

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Target '{target}'{} failed: {source}", describe_item(.item))]
    TargetFailed {
        target: String,
        item: Option<String>,
        source: Box<DevError>,
    },
}

impl DevError {
    pub fn target_failed(target: &str, item: Option<&str>, source: DevError) -> Self {
        Self::TargetFailed {
            target: target.to_string(),
            item: item.map(str::to_string),
            source: Box::new(source),
        }
    }

    /// The innermost cause, looking through target failure wrappers
    pub fn root_cause(&self) -> &DevError {
        match self {
            Self::TargetFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn describe_referrer(required_by: &Option<String>) -> String {
    match required_by {
        Some(referrer) => format!(" (required by '{}')", referrer),
        None => String::new(),
    }
}

fn describe_item(item: &Option<String>) -> String {
    match item {
        Some(item) => format!(" on '{}'", item),
        None => String::new(),
    }
}

fn describe_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("failed with exit code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Result type alias for dev operations
pub type DevResult<T> = Result<T, DevError>;
