//! Names of the stock targets

pub const BUILD: &str = "build";
pub const CLEAN: &str = "clean";
pub const COVERAGE: &str = "coverage";
pub const DEFAULT: &str = "default";
pub const DOTNET: &str = "dotnet";
pub const LINT: &str = "lint";
pub const PUBLISH: &str = "publish";
pub const SOLUTION: &str = "solution";
pub const TEST: &str = "test";
