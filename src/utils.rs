/// Calculate number of combinations C(n, k) without overflow
pub fn num_combinations(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    if k == 0 || k == n {
        return 1;
    }

    let k = k.min(n - k);
    let mut result = 1usize;

    for i in 0..k {
        result = result.saturating_mul(n - i) / (i + 1);
    }

    result
}

/// Render a coloring as `[0, 1, -, -]`, `-` marking unassigned vertices
pub fn format_coloring(colors: &[Option<usize>]) -> String {
    let cells: Vec<String> = colors
        .iter()
        .map(|c| match c {
            Some(c) => c.to_string(),
            None => "-".to_string(),
        })
        .collect();
    format!("[{}]", cells.join(", "))
}
