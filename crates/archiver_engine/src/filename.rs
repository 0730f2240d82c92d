/// Characters replaced by `-` in directory names.
const FORBIDDEN: &[char] = &[
    '/', '\\', ':', '?', '*', '"', '<', '>', '|', '(', ')', '\'', '!', '#', '&', '=', '+',
];

/// Turn a course or module title into a directory-safe name.
///
/// Accented French vowels are folded to ASCII, any other non-ASCII character
/// becomes a space, path and shell metacharacters become `-`, and whitespace
/// runs collapse to a single space.
pub fn clean_title(input: &str) -> String {
    let replaced: String = input
        .trim()
        .chars()
        .map(fold_accent)
        .map(|c| if FORBIDDEN.contains(&c) { '-' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_accent(c: char) -> char {
    if c.is_ascii() {
        return c;
    }
    match c {
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'à' | 'â' => 'a',
        'ô' => 'o',
        'ù' | 'û' => 'u',
        'î' | 'ï' => 'i',
        _ => ' ',
    }
}
