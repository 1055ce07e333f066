use anyhow::Result;
use dev_core::configs::project::config_schema;

pub fn execute() -> Result<()> {
    println!("{}", config_schema()?);
    Ok(())
}
