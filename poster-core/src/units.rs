use serde::Deserialize;

/// PostScript points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// One centimetre expressed in poster units (millimetres).
pub const CM: f64 = 10.0;

/// One millimetre expressed in poster units.
pub const MM: f64 = 1.0;

/// Convert millimetres to PostScript points.
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Convert PostScript points to millimetres.
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_MM
}

/// ISO 216 and North American paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PaperFormat {
    A0,
    A1,
    A2,
    A3,
    A4,
    Letter,
}

impl PaperFormat {
    /// Paper size in millimetres (width, height), portrait.
    pub fn size_mm(&self) -> (f64, f64) {
        match self {
            PaperFormat::A0 => (841.0, 1189.0),
            PaperFormat::A1 => (594.0, 841.0),
            PaperFormat::A2 => (420.0, 594.0),
            PaperFormat::A3 => (297.0, 420.0),
            PaperFormat::A4 => (210.0, 297.0),
            PaperFormat::Letter => (215.9, 279.4),
        }
    }

    /// Paper size in points (width, height).
    pub fn size_pt(&self) -> (f64, f64) {
        let (w, h) = self.size_mm();
        (mm_to_pt(w), mm_to_pt(h))
    }
}

impl Default for PaperFormat {
    fn default() -> Self {
        PaperFormat::A0
    }
}

/// How the poster canvas is mapped onto the paper.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    pub paper: PaperFormat,
    /// Center the canvas on the paper. When false the canvas origin
    /// sits on the paper origin.
    pub centered: bool,
    /// Scale the canvas uniformly so it fits inside the paper.
    pub fit_to_size: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        PageOptions {
            paper: PaperFormat::A0,
            centered: true,
            fit_to_size: false,
        }
    }
}

impl PageOptions {
    /// Compute the (scale, tx, ty) that maps a canvas of the given
    /// millimetre size onto the paper, in millimetres.
    pub fn canvas_mapping(
        &self,
        canvas_width: f64,
        canvas_height: f64,
    ) -> (f64, f64, f64) {
        let (pw, ph) = self.paper.size_mm();
        let scale = if self.fit_to_size
            && canvas_width > 0.0
            && canvas_height > 0.0
        {
            (pw / canvas_width).min(ph / canvas_height)
        } else {
            1.0
        };
        if self.centered {
            let tx = (pw - canvas_width * scale) / 2.0;
            let ty = (ph - canvas_height * scale) / 2.0;
            (scale, tx, ty)
        } else {
            (scale, 0.0, 0.0)
        }
    }
}
