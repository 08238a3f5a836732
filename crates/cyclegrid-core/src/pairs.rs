#![forbid(unsafe_code)]

//! Circular adjacency pairs.
//!
//! A sequence is read as a closed loop: every element is paired with its
//! successor and the last element wraps back to the first. For `s` of length
//! `L` the pairs are `(s[i], s[(i + 1) % L])` for `i in 0..L`.
//!
//! - `L == 0` yields no pairs.
//! - `L == 1` yields the self-loop `(s[0], s[0])`.

/// Iterator over the circular adjacency pairs of a slice.
#[derive(Debug, Clone)]
pub struct CircularPairs<'a> {
    seq: &'a [i64],
    pos: usize,
}

impl<'a> CircularPairs<'a> {
    #[inline]
    pub fn new(seq: &'a [i64]) -> Self {
        Self { seq, pos: 0 }
    }
}

impl Iterator for CircularPairs<'_> {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.seq.len();
        if self.pos >= len {
            return None;
        }
        let a = self.seq[self.pos];
        let b = self.seq[(self.pos + 1) % len];
        self.pos += 1;
        Some((a, b))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.seq.len() - self.pos.min(self.seq.len());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CircularPairs<'_> {}

/// Collect the circular adjacency pairs of `seq`.
pub fn circular_pairs(seq: &[i64]) -> Vec<(i64, i64)> {
    CircularPairs::new(seq).collect()
}
