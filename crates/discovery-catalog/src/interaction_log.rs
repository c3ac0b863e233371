//! JSON-lines interaction sink.
//!
//! Personalized and discovery events go to separate files, so a training job
//! reading `personalization.jsonl` never sees discovery-driven interactions.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use discovery_core::traits::InteractionTracker;
use discovery_core::types::{InteractionEvent, InteractionSource, MixComposition};

pub const PERSONALIZATION_FILE: &str = "personalization.jsonl";
pub const DISCOVERY_FILE: &str = "discovery.jsonl";
pub const COMPOSITION_FILE: &str = "composition.jsonl";

pub struct InteractionLog {
    dir: PathBuf,
    personalized: Mutex<File>,
    discovery: Mutex<File>,
    composition: Mutex<File>,
}

impl InteractionLog {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            personalized: Mutex::new(open_append(&dir.join(PERSONALIZATION_FILE))?),
            discovery: Mutex::new(open_append(&dir.join(DISCOVERY_FILE))?),
            composition: Mutex::new(open_append(&dir.join(COMPOSITION_FILE))?),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn append<T: Serialize>(file: &Mutex<File>, value: &T) -> Result<()> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');
        let mut file = file.lock().map_err(|_| anyhow::anyhow!("interaction log lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl InteractionTracker for InteractionLog {
    fn record(&self, event: InteractionEvent) {
        let file = match event.source() {
            InteractionSource::Personalized => &self.personalized,
            InteractionSource::Discovery => &self.discovery,
        };
        if let Err(e) = Self::append(file, &event) {
            warn!(error = %e, product_id = event.product_id(), "failed to write interaction");
        }
    }

    fn record_composition(&self, composition: &MixComposition) {
        if let Err(e) = Self::append(&self.composition, composition) {
            warn!(error = %e, "failed to write mix composition");
        }
    }
}

/// Read back one of the log files; a missing file reads as empty.
pub fn read_log<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let reader = BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(&line).with_context(|| format!("parsing line in {}", path.display()))?);
    }
    Ok(out)
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))
}
