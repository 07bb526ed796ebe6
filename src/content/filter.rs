/// Maximum chirp length in bytes
pub const MAX_CHIRP_LEN: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

/// Replace profane words with `****`.
///
/// Matching is per whitespace-separated word and case-insensitive; words with
/// attached punctuation (`Sharbert!`) are left alone. Runs of whitespace
/// collapse to a single space.
pub fn clean_body(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
