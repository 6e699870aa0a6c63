//! Scores a copied answer against the text that was sent.

/// One step of the alignment between sent and copied text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignOp {
    Match(char),
    Substitute { expected: char, typed: char },
    /// Copied but never sent
    Insert(char),
    /// Sent but missed
    Delete(char),
}

impl AlignOp {
    pub fn is_match(&self) -> bool {
        matches!(self, AlignOp::Match(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradeResult {
    pub ops: Vec<AlignOp>,
    pub correct: usize,
    pub errors: usize,
    /// Percentage of sent characters copied correctly
    pub accuracy: f64,
}

/// Uppercase and collapse whitespace runs into single spaces
fn normalize(text: &str) -> Vec<char> {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

/// Minimum edit alignment of `typed` against `expected`, ignoring case
pub fn grade(expected: &str, typed: &str) -> GradeResult {
    let expected = normalize(expected);
    let typed = normalize(typed);
    let (n, m) = (expected.len(), typed.len());

    // dist[i][j]: edits to turn expected[..i] into typed[..j]
    let mut dist = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in dist.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in dist[0].iter_mut().enumerate() {
        *cell = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(expected[i - 1] != typed[j - 1]);
            dist[i][j] = (dist[i - 1][j - 1] + cost)
                .min(dist[i - 1][j] + 1)
                .min(dist[i][j - 1] + 1);
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 {
            let same = expected[i - 1] == typed[j - 1];
            let cost = usize::from(!same);
            if dist[i][j] == dist[i - 1][j - 1] + cost {
                ops.push(if same {
                    AlignOp::Match(expected[i - 1])
                } else {
                    AlignOp::Substitute {
                        expected: expected[i - 1],
                        typed: typed[j - 1],
                    }
                });
                i -= 1;
                j -= 1;
                continue;
            }
        }
        if i > 0 && dist[i][j] == dist[i - 1][j] + 1 {
            ops.push(AlignOp::Delete(expected[i - 1]));
            i -= 1;
        } else {
            ops.push(AlignOp::Insert(typed[j - 1]));
            j -= 1;
        }
    }
    ops.reverse();

    let correct = ops.iter().filter(|op| op.is_match()).count();
    let errors = ops.len() - correct;
    GradeResult {
        accuracy: correct as f64 / n.max(1) as f64 * 100.0,
        ops,
        correct,
        errors,
    }
}
