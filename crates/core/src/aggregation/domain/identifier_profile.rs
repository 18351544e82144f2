/// Mean bounding-box geometry of one identifier across its frames.
///
/// A field that was missing in every detection is NaN.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdentifierProfile {
    pub width: f64,
    pub height: f64,
    pub x0: f64,
    pub y0: f64,
    /// Number of detections the means were taken over.
    pub detections: usize,
}

impl IdentifierProfile {
    /// Feature vector compared by cosine similarity: `[width, height, x0, y0]`.
    pub fn vector(&self) -> [f64; 4] {
        [self.width, self.height, self.x0, self.y0]
    }
}
