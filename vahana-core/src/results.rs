//! Ranked inference result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single ranked class prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub class_name: String,
    pub confidence: f32,
}

/// Classification results ordered by descending confidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classifications {
    items: Vec<Classification>,
}

impl Classifications {
    /// Pair each score with its position-indexed label and sort by
    /// descending confidence. Non-finite scores are dropped rather than
    /// allowed to poison the ordering.
    pub fn from_scores(labels: &[String], scores: &[f32]) -> Self {
        let mut items: Vec<Classification> = labels
            .iter()
            .zip(scores.iter())
            .filter(|(_, score)| score.is_finite())
            .map(|(label, score)| Classification {
                class_name: label.clone(),
                confidence: *score,
            })
            .collect();
        sort_by_confidence(&mut items, |c| c.confidence);
        Self { items }
    }

    pub fn best(&self) -> Option<&Classification> {
        self.items.first()
    }

    /// The `k` highest-confidence predictions (fewer if the result is short).
    pub fn top_k(&self, k: usize) -> &[Classification] {
        &self.items[..k.min(self.items.len())]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Classification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Classifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for item in self.top_k(5) {
            writeln!(
                f,
                "\tclass: \"{}\", confidence: {:.4}",
                item.class_name, item.confidence
            )?;
        }
        write!(f, "]")
    }
}

/// A detected object with its bounding box as (x, y, width, height).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub class_id: usize,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: (f32, f32, f32, f32),
}

/// Detection results ordered by descending confidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedObjects {
    items: Vec<DetectedObject>,
}

impl DetectedObjects {
    pub fn new(mut items: Vec<DetectedObject>) -> Self {
        items.retain(|d| d.confidence.is_finite());
        sort_by_confidence(&mut items, |d| d.confidence);
        Self { items }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DetectedObject> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn best(&self) -> Option<&DetectedObject> {
        self.items.first()
    }
}

impl fmt::Display for DetectedObjects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for item in self.items.iter() {
            writeln!(
                f,
                "\tclass: \"{}\", confidence: {:.4}, bbox: ({:.1}, {:.1}, {:.1}, {:.1})",
                item.class_name,
                item.confidence,
                item.bbox.0,
                item.bbox.1,
                item.bbox.2,
                item.bbox.3
            )?;
        }
        write!(f, "]")
    }
}

fn sort_by_confidence<T, F: Fn(&T) -> f32>(items: &mut [T], confidence: F) {
    items.sort_by(|a, b| {
        confidence(b)
            .partial_cmp(&confidence(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
