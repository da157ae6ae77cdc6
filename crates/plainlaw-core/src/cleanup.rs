use once_cell::sync::Lazy;
use regex::Regex;

use crate::static_regex;

static LINE_ENDINGS: Lazy<Regex> = Lazy::new(|| static_regex(r"\r\n?"));
static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| static_regex(r"[ \t]+"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| static_regex(r"\n\s*\n\s*\n+"));
static MISSING_SPACE: Lazy<Regex> = Lazy::new(|| static_regex(r"([.!?])([A-Z0-9])"));

/// Whitespace and punctuation tidy-up applied to the reassembled document.
/// Running it twice gives the same result as running it once.
pub fn final_cleanup(text: &str) -> String {
    let text = LINE_ENDINGS.replace_all(text, "\n");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    let text = MISSING_SPACE.replace_all(&text, "$1 $2");
    text.trim().to_string()
}
