//! Score mappings from raw findings to discrete scores

/// Score an error-wrap ratio. `None` when the file has no qualifying returns.
///
/// | ratio        | score |
/// |--------------|-------|
/// | 1.0          | 5     |
/// | >= 0.75      | 4     |
/// | >= 0.5       | 3     |
/// | >= 0.25      | 2     |
/// | below        | 1     |
pub fn wrap_ratio_score(wrapped: usize, total: usize) -> Option<u32> {
    if total == 0 {
        return None;
    }
    // Compare in integer space so 3/4 and 1/4 land exactly on the boundary
    let score = if wrapped >= total {
        5
    } else if wrapped * 4 >= total * 3 {
        4
    } else if wrapped * 2 >= total {
        3
    } else if wrapped * 4 >= total {
        2
    } else {
        1
    };
    Some(score)
}

/// Statement coverage percentage, `None` when there are no statements
pub fn coverage_percent(covered: u64, statements: u64) -> Option<f64> {
    if statements == 0 {
        None
    } else {
        Some(covered as f64 * 100.0 / statements as f64)
    }
}

/// Bucket overall statement coverage: `<50% → 1`, `50–80% → 2`, `>=80% → 3`
pub fn coverage_score(covered: u64, statements: u64) -> u32 {
    match coverage_percent(covered, statements) {
        Some(pct) if pct >= 80.0 => 3,
        Some(pct) if pct >= 50.0 => 2,
        _ => 1,
    }
}

/// Port-implementation score for one author. `None` when no interfaces exist (`N/A`).
pub fn port_score(implemented: usize, total: usize) -> Option<u32> {
    if total == 0 {
        None
    } else if implemented >= total {
        Some(3)
    } else if implemented > 0 {
        Some(2)
    } else {
        Some(1)
    }
}

/// Directory-presence score: all → 3, some → 2, none → 1
pub fn scaffolding_score(present: usize, required: usize) -> u32 {
    if present >= required {
        3
    } else if present > 0 {
        2
    } else {
        1
    }
}

/// Round a percentage to one decimal place for reporting
pub fn round_percent(pct: f64) -> f64 {
    (pct * 10.0).round() / 10.0
}
