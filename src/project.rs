use crate::category::{BlockClassifier, CategoryCounts};
use crate::fields::{optional_array, shape_name};
use crate::sprite::{analyze_with_options, AnalyzeOptions, SpriteRecord};
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone)]
pub struct ProjectAnalysis {
    pub stage: SpriteRecord,
    pub sprites: Vec<SpriteRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectTotals {
    pub targets: usize,
    pub scripts: usize,
    pub variables: usize,
    pub lists: usize,
    pub script_comments: usize,
    pub sounds: usize,
    pub costumes: usize,
    pub categories: CategoryCounts,
}

impl ProjectAnalysis {
    pub fn records(&self) -> impl Iterator<Item = &SpriteRecord> {
        std::iter::once(&self.stage).chain(self.sprites.iter())
    }

    pub fn totals(&self) -> ProjectTotals {
        let mut totals = ProjectTotals::default();
        for record in self.records() {
            totals.targets += 1;
            totals.scripts += record.script_count();
            totals.variables += record.variable_count();
            totals.lists += record.list_count();
            totals.script_comments += record.script_comment_count();
            totals.sounds += record.sound_count();
            totals.costumes += record.costume_count();
            totals.categories.add(record.category_counts());
        }
        totals
    }

    // The stage is never filtered out.
    pub fn filter_sprites(mut self, pattern: &Regex) -> Self {
        self.sprites.retain(|sprite| pattern.is_match(sprite.name()));
        self
    }
}

pub fn load_project(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read '{}'.", path.display()))?;
    if bytes.starts_with(ZIP_MAGIC) {
        let text = read_project_entry(&bytes)
            .with_context(|| format!("'{}' is not a valid .sb2 archive.", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("Invalid project.json inside '{}'.", path.display()));
    }
    serde_json::from_slice(&bytes)
        .with_context(|| format!("'{}' is neither a .sb2 archive nor JSON.", path.display()))
}

fn read_project_entry(bytes: &[u8]) -> Result<String> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = zip
        .by_name("project.json")
        .map_err(|_| anyhow!("project.json not found in archive."))?;
    let mut text = String::new();
    entry.read_to_string(&mut text)?;
    Ok(text)
}

pub fn analyze_project(
    root: &Value,
    classifier: &dyn BlockClassifier,
    options: AnalyzeOptions,
) -> Result<ProjectAnalysis> {
    if !root.is_object() {
        bail!(
            "Invalid project.json: root must be an object, found {}.",
            shape_name(root)
        );
    }
    let stage = analyze_with_options(root, classifier, options).context("Failed to analyze stage.")?;

    let mut sprites = Vec::new();
    let children = optional_array(root, "children", "Stage")?.unwrap_or(&[]);
    for (idx, child) in children.iter().enumerate() {
        if child.get("objName").is_none() {
            if !child.is_object() {
                warn!(index = idx, "skipping non-object stage child");
            } else {
                debug!(index = idx, "skipping watcher child");
            }
            continue;
        }
        let sprite = analyze_with_options(child, classifier, options)
            .with_context(|| format!("Failed to analyze stage child #{}.", idx))?;
        sprites.push(sprite);
    }

    Ok(ProjectAnalysis { stage, sprites })
}
