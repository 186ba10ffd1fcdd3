#![allow(dead_code)]

use bookbinder::{ProgressKind, ProgressReporter};
use std::sync::Mutex;

/// Reporter that records every event for later assertions
#[derive(Default)]
pub struct RecordingProgress {
    pub updates: Mutex<Vec<(ProgressKind, usize, usize)>>,
    pub errors: Mutex<Vec<String>>,
    pub permanent_errors: Mutex<Vec<String>>,
    pub done_messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn subpage_updates(&self) -> Vec<(usize, usize)> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _, _)| *kind == ProgressKind::Subpage)
            .map(|(_, done, total)| (*done, *total))
            .collect()
    }

    pub fn access_updates(&self) -> Vec<(usize, usize)> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _, _)| *kind == ProgressKind::CheckAccess)
            .map(|(_, done, total)| (*done, *total))
            .collect()
    }

    pub fn image_updates(&self) -> Vec<(usize, usize)> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _, _)| *kind == ProgressKind::Image)
            .map(|(_, done, total)| (*done, *total))
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn update_progress(&self, kind: ProgressKind, done: usize, total: usize) {
        self.updates.lock().unwrap().push((kind, done, total));
    }

    fn add_error_message(&self, text: &str) {
        self.errors.lock().unwrap().push(text.to_string());
    }

    fn add_permanent_error(&self, text: &str) {
        self.permanent_errors.lock().unwrap().push(text.to_string());
    }

    fn on_done(&self, text: &str) {
        self.done_messages.lock().unwrap().push(text.to_string());
    }
}

/// Configuration with pacing disabled so tests run instantly
pub fn fast_config() -> bookbinder::PrintConfig {
    bookbinder::PrintConfig {
        min_page_delay_ms: 0,
        max_page_delay_ms: 0,
        ..bookbinder::PrintConfig::default()
    }
}

/// A sub-page with primary content, a heading and optional extra markup
pub fn article_page(heading_id: &str, heading: &str, extra: &str) -> String {
    format!(
        "<html><body><div class=\"primary-content\">\
         <style>.local{{}}</style>\
         <div class=\"p-article-content\"><h1 id=\"{heading_id}\">{heading}</h1>{extra}</div>\
         </div></body></html>"
    )
}
