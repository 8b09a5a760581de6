use clap::{Parser, Subcommand};
use ycb_models::ClassRef;

#[derive(Parser)]
#[command(name = "ycb-models")]
#[command(version, about = "Download and inspect the YCB-Video object models", long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Download the model archive if it is not installed yet
	Download,

	/// List class ids and names
	Classes,

	/// Show files and derived quantities for a class
	Info {
		/// Class id (e.g. "14") or name (e.g. "025_mug")
		class: ClassRef,

		/// Grid dimension used to report the voxel pitch
		#[arg(long, default_value = "32")]
		dimension: usize,
	},

	/// Voxelize a class's CAD model with binvox and summarize the grid
	Voxelize {
		/// Class id or name
		class: ClassRef,

		/// Path to the binvox executable
		#[arg(long, default_value = "binvox")]
		binvox: std::path::PathBuf,

		/// Resolution passed to binvox
		#[arg(long, default_value = "32")]
		resolution: u32,
	},
}
