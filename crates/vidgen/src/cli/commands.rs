//! CLI command definitions.

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vidgen::{AssetId, AssetType};

/// vidgen - script → voice → face → video generation pipeline
#[derive(Parser, Debug)]
#[command(name = "vidgen")]
#[command(about = "Generate talking-head videos from a script, keeping every asset locally", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a script and print it
    Script {
        /// Prompt describing the script (defaults to the configured prompt)
        #[arg(long)]
        prompt: Option<String>,

        /// Also write the script to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate an image and select it
    Image {
        /// Prompt describing the image (defaults to the configured prompt)
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Speak a script and select the audio
    #[command(group(ArgGroup::new("source").required(true).args(["text", "script_file"])))]
    Audio {
        /// Script text
        #[arg(long)]
        text: Option<String>,

        /// File containing the script
        #[arg(long)]
        script_file: Option<PathBuf>,
    },

    /// Animate the selected image with the selected audio
    Video {
        /// Image to use instead of the newest one
        #[arg(long)]
        image: Option<AssetId>,

        /// Audio to use instead of the newest one
        #[arg(long)]
        audio: Option<AssetId>,
    },

    /// Run all four stages in order
    Run {
        /// Script prompt (defaults to the configured prompt)
        #[arg(long)]
        script_prompt: Option<String>,

        /// Image prompt (defaults to the configured prompt)
        #[arg(long)]
        image_prompt: Option<String>,
    },

    /// Store an image or audio file as an asset
    Upload {
        /// Asset type: image or audio
        asset_type: AssetType,

        /// File to upload
        path: PathBuf,
    },

    /// List stored assets, newest first
    List {
        /// Only list this type
        #[arg(long = "type")]
        asset_type: Option<AssetType>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Write an asset's bytes to a file
    Export {
        /// Asset to export
        id: AssetId,

        /// Destination file
        path: PathBuf,
    },

    /// Delete an asset
    Delete {
        /// Asset to delete
        id: AssetId,
    },

    /// Delete every asset
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
