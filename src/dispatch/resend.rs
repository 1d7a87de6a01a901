use std::collections::BTreeSet;

#[derive(Debug)]
enum ResendState {
    Collecting(BTreeSet<usize>),
    Drained,
}

/// Tracks bundle indices flagged during a protected pass and hands them out
/// exactly once for the synchronous resend pass.
#[derive(Debug)]
pub(crate) struct ResendSelector {
    state: ResendState,
}

impl ResendSelector {
    pub(crate) fn new() -> Self {
        Self {
            state: ResendState::Collecting(BTreeSet::new()),
        }
    }

    /// Returns `false` once the selector has been drained.
    pub(crate) fn flag(&mut self, index: usize) -> bool {
        match &mut self.state {
            ResendState::Collecting(indices) => {
                indices.insert(index);
                true
            }
            ResendState::Drained => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match &self.state {
            ResendState::Collecting(indices) => indices.len(),
            ResendState::Drained => 0,
        }
    }

    /// Flagged indices in ascending order. Later calls return nothing.
    pub(crate) fn drain(&mut self) -> Vec<usize> {
        match std::mem::replace(&mut self.state, ResendState::Drained) {
            ResendState::Collecting(indices) => indices.into_iter().collect(),
            ResendState::Drained => Vec::new(),
        }
    }
}
