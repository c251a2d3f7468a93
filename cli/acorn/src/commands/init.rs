//! `acorn init`: project scaffolding.

use std::fs;
use std::path::Path;

use acorn_platform::BoardVariant;
use anyhow::{bail, Context, Result};

use crate::manifest::{AcornManifest, MANIFEST_NAME};

/// Create a new Acorn project directory `name` relative to cwd.
pub fn run(name: &str, variant: BoardVariant) -> Result<()> {
    create_project(Path::new(name), name, variant)
}

pub(crate) fn create_project(project_dir: &Path, name: &str, variant: BoardVariant) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }
    fs::create_dir_all(project_dir)
        .with_context(|| format!("creating {}", project_dir.display()))?;

    fs::write(project_dir.join(MANIFEST_NAME), AcornManifest::template(variant))
        .with_context(|| format!("writing {MANIFEST_NAME}"))?;
    fs::write(project_dir.join(".gitignore"), "build/\n").context("writing .gitignore")?;

    println!("Created project '{name}' for {variant}");
    println!("  {name}/{MANIFEST_NAME}");
    println!("  {name}/.gitignore");
    Ok(())
}
