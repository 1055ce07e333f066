//! Command builders for the external tools the stock targets drive

pub mod dotnet;
pub mod git;
