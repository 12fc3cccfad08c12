//! Screenshot → alliance record pipeline.
//!
//! Runs each stage for all five fields before moving on:
//! crop → preprocess → OCR → parse, then assembles the record, classifies it
//! against the store and writes the staging file. Any failure aborts the
//! scan before anything is written.

use chrono::{DateTime, TimeZone};
use image::{GrayImage, RgbaImage};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::alliance::{
    assemble, match_alliance, write_record, AllianceRecord, AllianceStore, MatchOutcome,
    ParsedFields,
};
use crate::config::LayoutProfile;
use crate::error::ScanError;
use crate::fields::{field_specs, FieldSpec};
use crate::log;
use crate::ocr::{extract_region, parse_field, preprocess, OcrEngine};
use crate::paths::debug_dump_path;

/// Everything one scan needs, fixed for the duration of the run.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub image_path: PathBuf,
    pub output_path: PathBuf,
    pub server_id: i64,
    pub layout: LayoutProfile,
    /// Where preprocessed crops are dumped, if debugging
    pub debug_dir: Option<PathBuf>,
}

/// Pipeline progress. Each variant names the state reached after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    RegionsExtracted,
    Preprocessed,
    Recognized,
    Parsed,
    Assembled,
    Matched,
    Serialized,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::RegionsExtracted => "region extraction",
            Stage::Preprocessed => "preprocessing",
            Stage::Recognized => "recognition",
            Stage::Parsed => "parsing",
            Stage::Assembled => "assembly",
            Stage::Matched => "matching",
            Stage::Serialized => "serialization",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a successful scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub record: AllianceRecord,
    pub outcome: MatchOutcome,
    pub output_path: PathBuf,
}

impl ScanReport {
    /// What the user should run next.
    pub fn instruction(&self) -> Option<String> {
        self.outcome.instruction(&self.output_path)
    }
}

fn enter(stage: Stage) {
    log(&format!("Scan: {}", stage));
}

/// Loads the screenshot from `request.image_path` and scans it.
pub fn scan<Tz: TimeZone>(
    request: &ScanRequest,
    engine: &dyn OcrEngine,
    store: &dyn AllianceStore,
    captured_at: &DateTime<Tz>,
) -> Result<ScanReport, ScanError> {
    let img = image::open(&request.image_path)
        .map_err(|source| ScanError::Image {
            path: request.image_path.clone(),
            source,
        })?
        .to_rgba8();

    log(&format!(
        "Loaded {} ({}x{})",
        request.image_path.display(),
        img.width(),
        img.height()
    ));

    scan_image(&img, request, engine, store, captured_at)
}

/// Scans an already-loaded screenshot.
pub fn scan_image<Tz: TimeZone>(
    img: &RgbaImage,
    request: &ScanRequest,
    engine: &dyn OcrEngine,
    store: &dyn AllianceStore,
    captured_at: &DateTime<Tz>,
) -> Result<ScanReport, ScanError> {
    enter(Stage::Start);
    let specs = field_specs(&request.layout);

    let crops = specs
        .iter()
        .map(|spec| {
            extract_region(img, &spec.region).map_err(|e| ScanError::field(spec.field, e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    enter(Stage::RegionsExtracted);

    let processed = specs
        .iter()
        .zip(&crops)
        .map(|(spec, crop)| {
            preprocess(crop, spec.preprocess).map_err(|e| ScanError::field(spec.field, e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(dir) = &request.debug_dir {
        dump_fields(dir, &request.image_path, &specs, &processed);
    }
    enter(Stage::Preprocessed);

    let texts = specs
        .iter()
        .zip(&processed)
        .map(|(spec, field_img)| -> Result<String, ScanError> {
            let text = engine
                .recognize(field_img, spec.whitelist)
                .map_err(|e| ScanError::field(spec.field, e))?;
            log(&format!("{}: recognized {:?}", spec.field, text.trim()));
            Ok(text)
        })
        .collect::<Result<Vec<_>, _>>()?;
    enter(Stage::Recognized);

    let mut fields = ParsedFields::default();
    for (spec, text) in specs.iter().zip(&texts) {
        parse_field(spec.value_type, text)
            .and_then(|value| fields.set(spec.field, value))
            .map_err(|e| ScanError::field(spec.field, e))?;
    }
    enter(Stage::Parsed);

    let record = assemble(request.server_id, fields, captured_at);
    enter(Stage::Assembled);

    let outcome = match_alliance(store, request.server_id, &record.tag);
    match &outcome {
        MatchOutcome::New => log(&format!(
            "Alliance {} on server {} is new",
            record.tag, request.server_id
        )),
        MatchOutcome::Existing => log(&format!(
            "Alliance {} on server {} already exists",
            record.tag, request.server_id
        )),
        MatchOutcome::Error(reason) => return Err(ScanError::Store(reason.clone())),
    }
    enter(Stage::Matched);

    write_record(&record, &request.output_path)?;
    log(&format!("Wrote {}", request.output_path.display()));
    enter(Stage::Serialized);

    enter(Stage::Done);
    Ok(ScanReport {
        record,
        outcome,
        output_path: request.output_path.clone(),
    })
}

/// Saves each preprocessed crop for inspection. Failures are only logged.
fn dump_fields(dir: &Path, image_path: &Path, specs: &[FieldSpec], images: &[GrayImage]) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        log(&format!("Debug: cannot create {}: {}", dir.display(), e));
        return;
    }
    for (spec, img) in specs.iter().zip(images) {
        let path = debug_dump_path(dir, image_path, spec.field.as_str());
        if let Err(e) = img.save(&path) {
            log(&format!("Debug: failed to save {}: {}", path.display(), e));
        }
    }
}
