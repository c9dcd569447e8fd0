//! "Did you mean" suggestions for misspelled names.

/// Calculate the Levenshtein distance between two strings.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if chars1[i - 1] == chars2[j - 1] { 0 } else { 1 };
            matrix[i][j] = std::cmp::min(
                std::cmp::min(
                    matrix[i - 1][j] + 1, // deletion
                    matrix[i][j - 1] + 1, // insertion
                ),
                matrix[i - 1][j - 1] + cost, // substitution
            );
        }
    }

    matrix[len1][len2]
}

/// Find the closest candidate within a distance of 2, if any. The distance
/// must also be smaller than the input itself, so a one-letter name never
/// suggests an unrelated one-letter field.
pub fn closest_match<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_match = None;
    let mut best_distance = usize::MAX;
    let input_len = input.chars().count();

    for candidate in candidates {
        let distance = levenshtein_distance(input, candidate);
        // Only suggest if the distance is small (1-2 characters different)
        if distance > 0 && distance <= 2 && distance < input_len && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Suggest a correction for a misspelled struct field, formatted as a
/// ready-to-attach fix line. Returns `None` when nothing is close enough.
pub fn suggest_field<'a, I>(typo: &str, fields: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    closest_match(typo, fields).map(|field| format!("Did you mean '{}'?", field))
}
