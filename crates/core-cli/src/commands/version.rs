//! Version command

use anyhow::Result;
use core_update::BuildInfo;

use crate::cli::VersionArgs;

pub fn run(args: VersionArgs, info: &BuildInfo) -> Result<()> {
    println!("{}", render(&args, info)?);
    Ok(())
}

fn render(args: &VersionArgs, info: &BuildInfo) -> Result<String> {
    if args.json {
        return Ok(serde_json::to_string_pretty(info)?);
    }
    Ok(info.display())
}
