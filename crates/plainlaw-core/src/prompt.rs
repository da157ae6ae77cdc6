/// Instruction sent ahead of every chunk.
pub const SIMPLIFY_INSTRUCTION: &str = "You are an assistant specialized in simplifying legal language. \
Rewrite the input legal text in clear, everyday English that a 13-year-old can understand. \
Use short sentences, familiar words, and avoid complex sentence structures. \
Keep the original meaning and legal obligations intact. \
Preserve all numbers, dates, and percentages exactly. \
Highlight obligations, penalties, deadlines, and durations in plain terms. \
Return only the simplified text without any additional commentary.";

/// Build the full prompt for one chunk of legal text.
pub fn build_simplify_prompt(chunk: &str) -> String {
    let mut s = String::with_capacity(SIMPLIFY_INSTRUCTION.len() + chunk.len() + 48);
    s.push_str(SIMPLIFY_INSTRUCTION);
    s.push_str("\n\nLEGAL TEXT:\n");
    s.push_str(chunk.trim());
    s.push_str("\n\nSIMPLIFIED TEXT:");
    s
}
