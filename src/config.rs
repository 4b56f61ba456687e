// src/config.rs

use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::error::Result;
use crate::params::SimParams;

/// Provenance written next to every run's outputs.
#[derive(Serialize)]
pub struct RunConfig {
    pub params: SimParams,
    pub outputs: OutputConfig,
    pub run: RunInfo,
}

#[derive(Serialize)]
pub struct OutputConfig {
    pub frames_csv: bool,
    pub frame_pngs: bool,
    pub movie: bool,
    pub fps: u32,
}

#[derive(Serialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,
    /// Seed actually used for the initial angles (drawn if none was given).
    pub seed: u64,
    pub total_steps: usize,
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
