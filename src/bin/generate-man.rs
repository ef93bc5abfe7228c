// Render the renosheet man page(s) with clap_mangen.
//
// Usage: generate-man [OUTPUT_DIR]   (default: ./man)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::CommandFactory;
use renosheet::cli::Cli;

fn render(cmd: &clap::Command, dir: &std::path::Path, name: &str) -> Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut buffer)
        .with_context(|| format!("Failed to render man page for {}", name))?;
    let path = dir.join(format!("{}.1", name));
    std::fs::write(&path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cmd = Cli::command();
    render(&cmd, &out_dir, "renosheet")?;
    for sub in cmd.get_subcommands() {
        let name = format!("renosheet-{}", sub.get_name());
        render(sub, &out_dir, &name)?;
    }
    Ok(())
}
