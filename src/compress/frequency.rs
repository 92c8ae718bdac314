//! Per-channel symbol frequency counting.

/// Occurrence count of each of the 256 possible symbols in one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u32; 256],
}

impl FrequencyTable {
    /// An all-zero table.
    pub const fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Tally every symbol in `symbols`.
    ///
    /// Callers must keep `symbols.len()` within `u32`; the codec rejects
    /// larger channels before counting.
    pub fn from_symbols(symbols: &[u8]) -> Self {
        let mut table = Self::new();
        for &symbol in symbols {
            table.counts[symbol as usize] += 1;
        }
        table
    }

    /// Build a table directly from counts.
    pub const fn from_counts(counts: [u32; 256]) -> Self {
        Self { counts }
    }

    /// Occurrences of `symbol`.
    #[inline]
    pub fn count(&self, symbol: u8) -> u32 {
        self.counts[symbol as usize]
    }

    /// Number of symbols with a nonzero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// `(symbol, count)` for every present symbol, in ascending symbol order.
    pub fn iter_present(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
