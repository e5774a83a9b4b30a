/// Normalised Indel similarity in `0.0..=100.0`.
///
/// `100 * (1 - indel / (len(a) + len(b)))`, where the Indel distance counts
/// the insertions and deletions needed to turn `a` into `b`. Lengths are in
/// chars. Returns 0 when either side is empty.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 100.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    let lcs = longest_common_subsequence(&a, &b);
    let indel = total - 2 * lcs;

    100.0 * (1.0 - indel as f64 / total as f64)
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    // Single-row DP; glossary tokens are short.
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}
