//! Pre/post-processing pipelines binding images to engine tensors
//!
//! One parametrized pipeline covers every engine: the canonical square
//! size, pixel scaling, and channel layout are policy knobs selected per
//! engine variant instead of duplicated translator types.

use crate::criteria::EngineId;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use vahana_core::error::{Result, ZooError};
use vahana_core::results::{Classifications, DetectedObject, DetectedObjects};
use vahana_core::tensor::{Tensor, TensorList};

/// Converts a domain input into engine tensors and raw engine output
/// back into a domain result. Both directions are deterministic and
/// side-effect-free; any cached state (label lists) is immutable after
/// construction.
pub trait Translator: Send + Sync {
    type Output;

    fn preprocess(&self, image: &DynamicImage) -> Result<TensorList>;

    fn postprocess(&self, outputs: TensorList) -> Result<Self::Output>;
}

/// Tensor memory layout expected by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Channels-first: `[1, 3, H, W]`
    Chw,
    /// Channels-last: `[1, H, W, 3]`
    Hwc,
}

/// Image-classification pipeline: resize, optional `[0,1]` scaling,
/// layout conversion, then softmax over the single output tensor.
#[derive(Clone)]
pub struct ImageTranslator {
    resize: u32,
    scale: bool,
    layout: ChannelLayout,
    labels: Arc<Vec<String>>,
}

impl ImageTranslator {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            resize: 224,
            scale: true,
            layout: ChannelLayout::Chw,
            labels: Arc::new(labels),
        }
    }

    /// The fixed preprocessing policy for an engine variant.
    pub fn for_engine(engine: EngineId, labels: Vec<String>) -> Self {
        let translator = Self::new(labels);
        match engine {
            // TensorFlow models consume channels-last input
            EngineId::TensorFlow => translator.with_layout(ChannelLayout::Hwc),
            EngineId::MxNet | EngineId::PyTorch | EngineId::Builtin => translator,
        }
    }

    pub fn with_resize(mut self, side: u32) -> Self {
        self.resize = side;
        self
    }

    pub fn with_pixel_scaling(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_layout(mut self, layout: ChannelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Translator for ImageTranslator {
    type Output = Classifications;

    fn preprocess(&self, image: &DynamicImage) -> Result<TensorList> {
        let tensor = image_to_tensor(image, self.resize, self.scale, self.layout)?;
        Ok(TensorList::from(tensor))
    }

    fn postprocess(&self, outputs: TensorList) -> Result<Classifications> {
        let tensor = outputs.single()?;
        if tensor.element_count() != self.labels.len() {
            return Err(ZooError::ShapeMismatch(format!(
                "output tensor has {} elements, label list has {}",
                tensor.element_count(),
                self.labels.len()
            )));
        }
        let probabilities = softmax(tensor.data());
        Ok(Classifications::from_scores(&self.labels, &probabilities))
    }
}

/// Object-detection pipeline over `[1, n, 5 + classes]` output rows of
/// `[x, y, w, h, confidence, class scores...]` with normalized
/// coordinates. Applies confidence thresholding, class argmax, and
/// IoU-based non-maximum suppression.
#[derive(Clone)]
pub struct DetectionTranslator {
    resize: u32,
    scale: bool,
    confidence_threshold: f32,
    nms_threshold: f32,
    labels: Arc<Vec<String>>,
}

impl DetectionTranslator {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            resize: 640,
            scale: true,
            confidence_threshold: 0.5,
            nms_threshold: 0.4,
            labels: Arc::new(labels),
        }
    }

    pub fn with_resize(mut self, side: u32) -> Self {
        self.resize = side;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
        self.nms_threshold = threshold;
        self
    }
}

impl Translator for DetectionTranslator {
    type Output = DetectedObjects;

    fn preprocess(&self, image: &DynamicImage) -> Result<TensorList> {
        let tensor = image_to_tensor(image, self.resize, self.scale, ChannelLayout::Chw)?;
        Ok(TensorList::from(tensor))
    }

    fn postprocess(&self, outputs: TensorList) -> Result<DetectedObjects> {
        let tensor = outputs.single()?;
        let shape = tensor.shape();
        let row_len = 5 + self.labels.len();
        if shape.len() != 3 || shape[0] != 1 || shape[2] != row_len {
            return Err(ZooError::ShapeMismatch(format!(
                "expected detection output [1, n, {}], got {:?}",
                row_len, shape
            )));
        }

        let mut detections = Vec::new();
        for row in tensor.data().chunks_exact(row_len) {
            let confidence = row[4];
            if !confidence.is_finite() || confidence <= self.confidence_threshold {
                continue;
            }

            // Class with the highest probability
            let mut max_class = 0;
            let mut max_prob = 0.0f32;
            for (class_idx, prob) in row[5..].iter().enumerate() {
                if *prob > max_prob {
                    max_prob = *prob;
                    max_class = class_idx;
                }
            }
            if max_prob <= self.confidence_threshold {
                continue;
            }

            let (x, y, w, h) = (row[0], row[1], row[2], row[3]);
            if !x.is_finite() || !y.is_finite() || !w.is_finite() || !h.is_finite() {
                continue;
            }
            // Coordinates are normalized; drop out-of-range rows
            if !(0.0..=1.0).contains(&x)
                || !(0.0..=1.0).contains(&y)
                || !(0.0..=1.0).contains(&w)
                || !(0.0..=1.0).contains(&h)
            {
                continue;
            }

            detections.push(DetectedObject {
                class_id: max_class,
                class_name: self.labels[max_class].clone(),
                confidence: max_prob,
                bbox: (x, y, w, h),
            });
        }

        let kept = apply_nms(detections, self.nms_threshold);
        Ok(DetectedObjects::new(kept))
    }
}

/// Resize to a square side, convert to RGB float32 in the requested
/// layout, optionally scaling pixels to `[0, 1]`.
fn image_to_tensor(
    image: &DynamicImage,
    side: u32,
    scale: bool,
    layout: ChannelLayout,
) -> Result<Tensor> {
    if side == 0 {
        return Err(ZooError::ShapeMismatch(
            "resize target must be non-zero".to_string(),
        ));
    }

    let pixel_count = (side as usize)
        .checked_mul(side as usize)
        .and_then(|p| p.checked_mul(3))
        .ok_or_else(|| {
            ZooError::ShapeMismatch(format!("resize target {} too large", side))
        })?;
    if pixel_count > 100_000_000 {
        return Err(ZooError::ShapeMismatch(
            "resize target too large (max 100M elements)".to_string(),
        ));
    }

    let resized = image
        .resize_exact(side, side, FilterType::Triangle)
        .to_rgb8();
    let divisor = if scale { 255.0f32 } else { 1.0f32 };

    let side = side as usize;
    let mut data = vec![0.0f32; pixel_count];
    match layout {
        ChannelLayout::Chw => {
            let plane = side * side;
            for (i, pixel) in resized.pixels().enumerate() {
                for c in 0..3 {
                    data[c * plane + i] = pixel[c] as f32 / divisor;
                }
            }
        }
        ChannelLayout::Hwc => {
            for (i, pixel) in resized.pixels().enumerate() {
                for c in 0..3 {
                    data[i * 3 + c] = pixel[c] as f32 / divisor;
                }
            }
        }
    }

    let shape = match layout {
        ChannelLayout::Chw => vec![1, 3, side, side],
        ChannelLayout::Hwc => vec![1, side, side, 3],
    };
    Tensor::new(shape, data)
}

/// Numerically stable softmax.
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores
        .iter()
        .copied()
        .filter(|s| s.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; scores.len()];
    }
    let exps: Vec<f32> = scores
        .iter()
        .map(|s| if s.is_finite() { (s - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; scores.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Non-maximum suppression over confidence-sorted detections.
fn apply_nms(mut detections: Vec<DetectedObject>, iou_threshold: f32) -> Vec<DetectedObject> {
    if detections.is_empty() {
        return detections;
    }

    detections.retain(|d| d.confidence.is_finite());
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());
        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if compute_iou(&detections[i].bbox, &detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }
    keep
}

/// Intersection over union of two (x, y, width, height) boxes.
fn compute_iou(a: &(f32, f32, f32, f32), b: &(f32, f32, f32, f32)) -> f32 {
    let (ax, ay, aw, ah) = *a;
    let (bx, by, bw, bh) = *b;
    if aw < 0.0 || ah < 0.0 || bw < 0.0 || bh < 0.0 {
        return 0.0;
    }

    let inter_x_min = ax.max(bx);
    let inter_y_min = ay.max(by);
    let inter_x_max = (ax + aw).min(bx + bw);
    let inter_y_max = (ay + ah).min(by + bh);

    if inter_x_max <= inter_x_min || inter_y_max <= inter_y_min {
        return 0.0;
    }

    let inter_area = (inter_x_max - inter_x_min) * (inter_y_max - inter_y_min);
    let union_area = aw * ah + bw * bh - inter_area;
    if union_area <= 0.0 || !union_area.is_finite() {
        return 0.0;
    }

    let iou = inter_area / union_area;
    if iou.is_finite() && (0.0..=1.0).contains(&iou) {
        iou
    } else {
        0.0
    }
}

/// Load a position-indexed label list, one label per line. Blank lines
/// are skipped.
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
