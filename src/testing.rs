//! Deterministic stand-ins for the OCR engine and alliance store.

use image::GrayImage;
use std::cell::RefCell;
use std::collections::VecDeque;

use crate::alliance::{AllianceRecord, AllianceStore, Lookup};
use crate::error::FieldError;
use crate::ocr::OcrEngine;

/// One call seen by [`ScriptedOcr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrCall {
    pub dimensions: (u32, u32),
    pub whitelist: Option<String>,
}

/// Returns canned text in call order and records what it was asked.
#[derive(Default)]
pub struct ScriptedOcr {
    responses: RefCell<VecDeque<Result<String, String>>>,
    calls: RefCell<Vec<OcrCall>>,
}

impl ScriptedOcr {
    /// Responses for tag, name, power, gift level and member count, in that order.
    pub fn new<'a>(responses: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            calls: RefCell::default(),
        }
    }

    /// Makes the call at `index` fail instead of answering.
    pub fn fail_at(self, index: usize, reason: &str) -> Self {
        self.responses
            .borrow_mut()
            .insert(index, Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<OcrCall> {
        self.calls.borrow().clone()
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, img: &GrayImage, whitelist: Option<&str>) -> Result<String, FieldError> {
        self.calls.borrow_mut().push(OcrCall {
            dimensions: img.dimensions(),
            whitelist: whitelist.map(str::to_string),
        });
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(FieldError::Ocr(reason)),
            None => Ok(String::new()),
        }
    }
}

/// In-memory alliance store.
#[derive(Default)]
pub struct MemoryStore {
    alliances: Vec<AllianceRecord>,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn with_alliance(server_id: i64, tag: &str, name: &str) -> Self {
        Self {
            alliances: vec![AllianceRecord {
                server_id,
                tag: tag.to_string(),
                name: name.to_string(),
                history: Vec::new(),
            }],
            failure: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            alliances: Vec::new(),
            failure: Some(reason.to_string()),
        }
    }
}

impl AllianceStore for MemoryStore {
    fn lookup_by_tag(&self, server_id: i64, tag: &str) -> Lookup {
        if let Some(reason) = &self.failure {
            return Lookup::Failed(reason.clone());
        }
        self.alliances
            .iter()
            .find(|a| a.server_id == server_id && a.tag == tag)
            .cloned()
            .map(Lookup::Found)
            .unwrap_or(Lookup::NotFound)
    }
}
