//! Archive entry naming.

const MAX_LEN: usize = 30;
const EMPTY_NAME: &str = "video";

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || c == '_' || is_cjk_ideograph(c)
}

/// Reduce free text (a prompt, a project name) to a safe file stem.
///
/// Keeps ASCII letters and digits, CJK ideographs and underscores, turns
/// ASCII whitespace into `_` (other whitespace is dropped), caps the result at 30 characters and trims
/// trailing underscores. An empty result becomes `"video"`. Applying it
/// twice gives the same result as applying it once.
pub fn sanitize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|&c| is_kept(c))
        .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
        .take(MAX_LEN)
        .collect();
    let trimmed = cleaned.trim_end_matches('_');
    if trimmed.is_empty() {
        EMPTY_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `"{index:03}_{stem}.mp4"`, where `index` is the clip's 1-based position.
pub fn clip_entry_name(index: usize, label: &str) -> String {
    format!("{index:03}_{}.mp4", sanitize(label))
}

/// Download name for a project's export archive.
pub fn archive_file_name(project_name: &str) -> String {
    format!("{}_export.zip", sanitize(project_name))
}
