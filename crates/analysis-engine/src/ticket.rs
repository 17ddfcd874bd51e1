//! Tagging of in-flight analysis requests so late results for a position
//! the user already left are dropped.

/// Identifies the position an analysis request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub fen: String,
}

/// Per-session generation counter. Every position change bumps it; only a
/// ticket from the current generation may publish its result.
#[derive(Debug, Clone, Default)]
pub struct AnalysisTracker {
    generation: u64,
    fen: Option<String>,
}

impl AnalysisTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The displayed position changed: outstanding tickets become stale.
    pub fn position_changed(&mut self, fen: &str) {
        if self.fen.as_deref() != Some(fen) {
            self.generation += 1;
            self.fen = Some(fen.to_string());
        }
    }

    pub fn issue(&mut self, fen: &str) -> AnalysisTicket {
        self.position_changed(fen);
        AnalysisTicket {
            generation: self.generation,
            fen: fen.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &AnalysisTicket) -> bool {
        ticket.generation == self.generation && self.fen.as_deref() == Some(ticket.fen.as_str())
    }
}
