//! Consecutive-read confirmation for the camera flow

/// Requires the same code on consecutive camera reads before accepting it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityGate {
    threshold: u32,
    candidate: Option<(String, u32)>,
}

impl StabilityGate {
    /// Gate accepting after `threshold` identical reads (0 behaves as 1)
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            candidate: None,
        }
    }

    /// Record a read; true once it has been seen `threshold` times in a row
    pub fn observe(&mut self, code: &str) -> bool {
        let count = match &mut self.candidate {
            Some((current, count)) if current.as_str() == code => {
                *count += 1;
                *count
            }
            _ => {
                self.candidate = Some((code.to_string(), 1));
                1
            }
        };
        count >= self.threshold
    }

    /// Current `(code, count)`
    pub fn candidate(&self) -> Option<(&str, u32)> {
        self.candidate.as_ref().map(|(c, n)| (c.as_str(), *n))
    }

    /// Configured threshold
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Forget the running candidate
    pub fn reset(&mut self) {
        self.candidate = None;
    }
}
