//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;

/// Values given here override the config file.
#[derive(Parser, Debug)]
#[command(name = "sky_viewer", about = "Precomputed atmospheric scattering viewer")]
pub struct CliArgs {
    /// RON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding transmittance.dat, scattering.dat and irradiance.dat.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Start from view preset 1-9.
    #[arg(long)]
    pub preset: Option<u8>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ViewerConfig {
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.assets {
            self.assets.dir = dir.clone();
        }
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(p) = args.preset {
            self.display.initial_preset = Some(p);
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
    }
}
