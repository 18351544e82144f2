use crate::shared::identifier::Identifier;

/// Bounding box in source pixel coordinates: top-left corner plus size.
///
/// A field the source reported as missing is carried as NaN so the
/// aggregator can drop it instead of averaging a fabricated zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, width: f64, height: f64) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Fields in feature-vector order: `[width, height, x0, y0]`.
    pub fn features(&self) -> [f64; 4] {
        [self.width, self.height, self.x0, self.y0]
    }
}

/// One observed face box for one identifier in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub identifier: Identifier,
    pub frame: u64,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(identifier: impl Into<Identifier>, frame: u64, bbox: BoundingBox) -> Self {
        Self {
            identifier: identifier.into(),
            frame,
            bbox,
        }
    }
}
