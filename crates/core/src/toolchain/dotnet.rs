use crate::execution::command::CommandSpec;
use crate::settings::DevSettings;

pub const PROGRAM: &str = "dotnet";

/// `dotnet <verb> [<path>] --configuration <cfg> --verbosity minimal --nologo`
///
/// Verb-specific arguments are appended by the caller.
pub fn command(settings: &DevSettings, verb: &str, path: Option<&str>) -> CommandSpec {
    let mut spec = CommandSpec::new(PROGRAM).arg(verb);
    if let Some(path) = path {
        spec = spec.arg(path);
    }

    spec.args([
        "--configuration",
        settings.build_configuration.as_str(),
        "--verbosity",
        "minimal",
        "--nologo",
    ])
}
