//! Reflection spectra and their reduction to a single resonance point.

/// A swept response: frequencies and the reflection magnitude (dB) measured
/// at each one. The two sequences are parallel and expected to be of equal
/// length; iteration stops at the shorter one.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub freq: Vec<f64>,
    pub mag: Vec<f64>,
}

/// The deepest dip of a curve: where the antenna actually resonates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resonance {
    pub freq: f64,
    pub mag: f64,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.freq.len().min(self.mag.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First (lowest-index) minimum of the magnitude trace, with the
    /// frequency it occurs at. Ties keep the earliest point. `None` for an
    /// empty curve.
    pub fn resonance(&self) -> Option<Resonance> {
        let mut best: Option<Resonance> = None;
        for (&freq, &mag) in self.freq.iter().zip(self.mag.iter()) {
            let better = match best {
                None => true,
                Some(b) => mag < b.mag,
            };
            if better {
                best = Some(Resonance { freq, mag });
            }
        }
        best
    }
}
