mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use ycb_models::voxel::BinvoxCommand;
use ycb_models::{Config, ModelCatalog, CLASS_NAMES};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to resolve dataset directory")?;

    match cli.command {
        Commands::Download => {
            let catalog =
                ModelCatalog::open(&config).context("Failed to install YCB-Video models")?;

            println!("✓ Models available");
            println!("  Path: {:?}", catalog.root_dir());
        }

        Commands::Classes => {
            for (id, name) in CLASS_NAMES.iter().enumerate() {
                println!("{:>3}  {}", id, name);
            }
        }

        Commands::Info { class, dimension } => {
            let catalog = ModelCatalog::open(&config)?;
            let name = catalog.resolve_class_name(&class)?;

            tracing::info!("Inspecting '{}'", name);
            let cad = catalog
                .cad(&class)
                .with_context(|| format!("Failed to load CAD model for '{}'", name))?;
            let pcd = catalog
                .pcd(&class)
                .with_context(|| format!("Failed to load point cloud for '{}'", name))?;

            let output = serde_json::json!({
                "class": name,
                "cad_file": catalog.cad_file_path(&class)?,
                "pcd_file": catalog.pcd_file_path(&class)?,
                "vertices": cad.vertices.len(),
                "faces": cad.faces.len(),
                "triangulated": cad.is_triangulated(),
                "texture": cad.texture,
                "points": pcd.len(),
                "bbox_diagonal": catalog.bbox_diagonal(&class)?,
                "voxel_dimension": dimension,
                "voxel_pitch": catalog.voxel_pitch(dimension, &class)?,
            });

            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Voxelize {
            class,
            binvox,
            resolution,
        } => {
            let catalog = ModelCatalog::builder(config)
                .voxelizer(Arc::new(BinvoxCommand {
                    executable: binvox,
                    dimension: resolution,
                }))
                .build()?;
            let name = catalog.resolve_class_name(&class)?;

            let grid = catalog
                .solid_voxel_grid(&class)
                .with_context(|| format!("Failed to voxelize '{}'", name))?;

            let output = serde_json::json!({
                "class": name,
                "voxels": grid.summary(),
            });

            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
