/// Measures rendered label widths in layout units.
///
/// Drawing surfaces know how wide their text really is; the renderer only
/// needs the number to place disclosure indicators and link anchors.
pub trait LabelMeasure {
    fn label_width(&self, label: &str) -> f64;
}

impl<F> LabelMeasure for F
where
    F: Fn(&str) -> f64,
{
    fn label_width(&self, label: &str) -> f64 {
        self(label)
    }
}

/// Every character advances by the same amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    pub advance: f64,
}

impl FixedAdvance {
    /// One unit per character, for character-cell surfaces.
    pub const CELLS: FixedAdvance = FixedAdvance { advance: 1.0 };

    pub const fn new(advance: f64) -> Self {
        Self { advance }
    }
}

impl Default for FixedAdvance {
    /// Rough average advance of an 18px sans-serif face.
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl LabelMeasure for FixedAdvance {
    fn label_width(&self, label: &str) -> f64 {
        label.chars().count() as f64 * self.advance
    }
}
