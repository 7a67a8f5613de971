//! Cinder CLI - inspect, export and repack game package files.
//!
//! This is the main entry point for the Cinder command-line application.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinder::prelude::*;

/// Cinder - game package inspection tool
#[derive(Parser)]
#[command(name = "cinder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the packages in a root directory
    List {
        /// Directory holding .pkg and .pkg_manifest files
        #[arg(short, long, env = "CINDER_ROOT")]
        root: PathBuf,
    },

    /// List the entries of one package
    Entries {
        #[arg(short, long, env = "CINDER_ROOT")]
        root: PathBuf,

        /// Package name, without extension
        package: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export the textures of a package as PNG files
    Export {
        #[arg(short, long, env = "CINDER_ROOT")]
        root: PathBuf,

        package: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Only export textures whose name matches this glob pattern
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Decode a package and write it back out
    Repack {
        #[arg(short, long, env = "CINDER_ROOT")]
        root: PathBuf,

        package: String,

        /// Output path without extension
        #[arg(short, long)]
        output: PathBuf,

        /// Write the package file without chunk compression
        #[arg(long)]
        no_compress: bool,
    },

    /// Replace textures with PNG files and write the package back out
    Import {
        #[arg(short, long, env = "CINDER_ROOT")]
        root: PathBuf,

        package: String,

        /// Directory laid out like the output of `export`
        #[arg(short, long)]
        textures: PathBuf,

        /// Output path without extension
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Load packages and show which textures their atlases point at
    Atlases {
        #[arg(short, long, env = "CINDER_ROOT")]
        root: PathBuf,

        /// Packages to load; every package in the root when empty
        packages: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::List { root } => cmd_list(&root)?,
        Commands::Entries {
            root,
            package,
            json,
        } => cmd_entries(&root, &package, json)?,
        Commands::Export {
            root,
            package,
            output,
            filter,
        } => cmd_export(&root, &package, &output, filter.as_deref())?,
        Commands::Repack {
            root,
            package,
            output,
            no_compress,
        } => cmd_repack(&root, &package, &output, !no_compress)?,
        Commands::Import {
            root,
            package,
            textures,
            output,
        } => cmd_import(&root, &package, &textures, &output)?,
        Commands::Atlases { root, packages } => cmd_atlases(&root, packages)?,
    }

    Ok(())
}

fn open_package(root: &Path, name: &str) -> Result<Package> {
    Package::open(root, name).with_context(|| format!("Failed to load package {}", name))
}

fn bar_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
        .progress_chars("#>-"))
}

fn cmd_list(root: &Path) -> Result<()> {
    let manager = PackageManager::open(root).context("Failed to scan package root")?;
    let snapshot = manager.snapshot();

    for name in snapshot.packages() {
        let size = snapshot.package_size(name).unwrap_or(0);
        println!("{:>12} {}", size, name);
    }
    println!("\nTotal: {} packages", snapshot.packages().len());

    Ok(())
}

#[derive(Serialize)]
struct EntryRow {
    file: String,
    index: usize,
    kind: String,
    name: String,
}

fn cmd_entries(root: &Path, name: &str, json: bool) -> Result<()> {
    let package = open_package(root, name)?;

    let mut rows = Vec::new();
    for kind in [FileKind::Manifest, FileKind::Package] {
        for (reference, entry) in package.references(kind)? {
            rows.push(EntryRow {
                file: reference.package().display_name(),
                index: reference.index(),
                kind: entry.entry_type().to_string(),
                name: entry.display_name(),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!("{:<24} {:>5} {:<15} {}", row.file, row.index, row.kind, row.name);
    }
    println!("\nTotal: {} entries", rows.len());

    Ok(())
}

/// Every 2D texture of a package, including textures embedded in atlases.
fn package_textures(package: &Package) -> Result<Vec<&TextureEntry>> {
    let mut textures = Vec::new();
    for kind in [FileKind::Manifest, FileKind::Package] {
        for entry in package.contents(kind)? {
            match entry {
                Entry::Texture(texture) => textures.push(texture),
                Entry::Atlas(atlas) => textures.extend(atlas.included_texture()),
                _ => {}
            }
        }
    }
    Ok(textures)
}

/// Texture names use backslashes as separators.
fn texture_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.png", name.replace('\\', "/")))
}

fn cmd_export(root: &Path, name: &str, output: &Path, filter: Option<&str>) -> Result<()> {
    let package = open_package(root, name)?;
    let pattern = filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;

    let textures: Vec<_> = package_textures(&package)?
        .into_iter()
        .filter(|t| pattern.as_ref().map_or(true, |p| p.matches(&t.name)))
        .collect();
    println!("Exporting {} textures...", textures.len());

    fs::create_dir_all(output)?;
    let pb = ProgressBar::new(textures.len() as u64);
    pb.set_style(bar_style()?);

    let decoders = Decoders::default();
    let errors = AtomicUsize::new(0);
    let start = Instant::now();

    textures.par_iter().for_each(|texture| {
        if let Err(err) = export_texture(texture, output, &decoders) {
            warn!(texture = %texture.name, error = %err, "export failed");
            errors.fetch_add(1, Ordering::Relaxed);
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");
    println!(
        "Exported {} textures in {:?} ({} errors)",
        textures.len() - errors.load(Ordering::Relaxed),
        start.elapsed(),
        errors.load(Ordering::Relaxed)
    );

    Ok(())
}

fn export_texture(entry: &TextureEntry, output: &Path, decoders: &Decoders) -> Result<()> {
    let texture = &entry.texture;
    let (width, height) = texture.dimensions();
    let rgba = texture.rgba_data(decoders)?;

    let image = image::RgbaImage::from_raw(width as u32, height as u32, rgba.to_vec())
        .context("Pixel buffer does not match texture dimensions")?;

    let path = texture_path(output, &entry.name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    image.save(&path)?;
    Ok(())
}

fn cmd_repack(root: &Path, name: &str, output: &Path, compress: bool) -> Result<()> {
    let package = open_package(root, name)?;

    let start = Instant::now();
    package
        .write_package_files_with(output, WriteOptions { compress })
        .context("Failed to write package files")?;
    println!("Repacked {} in {:?}", name, start.elapsed());

    Ok(())
}

fn cmd_import(root: &Path, name: &str, textures: &Path, output: &Path) -> Result<()> {
    let package = open_package(root, name)?;

    let mut replaced = 0;
    for entry in package_textures(&package)? {
        let path = texture_path(textures, &entry.name);
        if !path.is_file() {
            continue;
        }

        let image = image::open(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        entry
            .texture
            .set_rgba_data(image.into_raw(), width as usize, height as usize);
        info!(texture = %entry.name, width, height, "replaced texture");
        replaced += 1;
    }

    package
        .write_package_files(output)
        .context("Failed to write package files")?;
    println!("Imported {} textures into {}", replaced, output.display());

    Ok(())
}

fn cmd_atlases(root: &Path, packages: Vec<String>) -> Result<()> {
    let manager = PackageManager::open(root).context("Failed to scan package root")?;
    let names = if packages.is_empty() {
        manager.packages()
    } else {
        packages
    };

    let pb = ProgressBar::new(1000);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")?
            .progress_chars("#>-"),
    );

    let task = manager.load_packages_async(names.clone());
    for progress in task.progress().iter() {
        pb.set_position((progress.fraction * 1000.0) as u64);
        pb.set_message(progress.package);
    }
    let summary = task.wait()?;
    pb.finish_and_clear();

    for (name, err) in &summary.failed {
        eprintln!("Error loading {}: {}", name, err);
    }

    let loaded = manager.loaded_packages();
    for name in &names {
        let Some(package) = loaded.get(name) else {
            continue;
        };
        for kind in [FileKind::Manifest, FileKind::Package] {
            for (reference, entry) in package.references(kind)? {
                let Some(atlas) = entry.as_atlas() else {
                    continue;
                };
                let target = match atlas.referenced_texture_name() {
                    Some(texture) => match manager.texture_package_name(texture) {
                        Some(owner) => format!("{} (in {})", texture, owner),
                        None => format!("{} (not loaded)", texture),
                    },
                    None => "<included>".to_string(),
                };
                println!(
                    "{:<28} {:>4} sub-atlases -> {}",
                    reference.to_string(),
                    atlas.sub_atlases.len(),
                    target
                );
            }
        }
    }

    println!(
        "\nLoaded {} packages ({} already loaded, {} failed)",
        summary.loaded.len(),
        summary.skipped.len(),
        summary.failed.len()
    );

    Ok(())
}
