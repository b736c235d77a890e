//! Box arithmetic shared by the detection backends.

/// Candidate detection as `[x1, y1, x2, y2]` plus score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub score: f64,
}

/// IoU between two bounding boxes.
pub fn bbox_iou(a: &ScoredBox, b: &ScoredBox) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

/// Greedy NMS: sort by score descending, suppress overlapping boxes.
///
/// The surviving boxes keep score order, so the first one is the
/// detector's best candidate.
pub fn nms(dets: &mut [ScoredBox], iou_thresh: f64) -> Vec<ScoredBox> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<ScoredBox> = Vec::new();
    for det in dets.iter() {
        if keep.iter().all(|k| bbox_iou(k, det) <= iou_thresh) {
            keep.push(*det);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sbox(x1: f64, y1: f64, x2: f64, y2: f64, score: f64) -> ScoredBox {
        ScoredBox {
            x1,
            y1,
            x2,
            y2,
            score,
        }
    }

    #[test]
    fn test_bbox_iou_no_overlap() {
        let a = sbox(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = sbox(20.0, 20.0, 30.0, 30.0, 1.0);
        assert_eq!(bbox_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_bbox_iou_perfect_overlap() {
        let a = sbox(0.0, 0.0, 10.0, 10.0, 1.0);
        assert!((bbox_iou(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_iou_partial_overlap() {
        let a = sbox(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = sbox(5.0, 5.0, 15.0, 15.0, 1.0);
        assert!((bbox_iou(&a, &b) - 25.0 / 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_nms_suppresses_overlapping_keeps_best() {
        let mut dets = vec![
            sbox(0.0, 0.0, 100.0, 100.0, 0.5),
            sbox(2.0, 2.0, 102.0, 102.0, 0.9),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_nms_keeps_separate_in_score_order() {
        let mut dets = vec![
            sbox(0.0, 0.0, 50.0, 50.0, 0.6),
            sbox(200.0, 200.0, 250.0, 250.0, 0.8),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].x1, 200.0);
    }

    #[test]
    fn test_nms_empty_input() {
        let mut dets: Vec<ScoredBox> = Vec::new();
        assert!(nms(&mut dets, 0.3).is_empty());
    }
}
