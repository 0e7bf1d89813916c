//! Shell-style glob to regex translation
//!
//! Globs are the user-facing pattern syntax for name filtering. Each glob is
//! translated to a regex that matches the full name, so `*.txt` hits
//! `notes.txt` but not `notes.txt.bak`. Partial matching can be requested
//! explicitly, in which case the translated pattern is left unanchored.

/// Translate one glob pattern into a regex pattern string
///
/// Supported syntax: `*` matches any run of characters, `?` matches one
/// character, `[seq]` matches a character class and `[!seq]` its negation.
/// All other characters match literally. The result is anchored for a
/// full-string match unless `partial` is true.
pub fn glob_to_regex(pattern: &str, partial: bool) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                // Scan ahead for the closing bracket; a ']' directly after
                // the opening '[' (or after '[!') is a literal member.
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("\\[");
                } else {
                    let mut class: String = chars[i..j].iter().collect();
                    class = class.replace('\\', "\\\\");
                    out.push('[');
                    if let Some(rest) = class.strip_prefix('!') {
                        out.push('^');
                        out.push_str(rest);
                    } else {
                        out.push_str(&class);
                    }
                    out.push(']');
                    i = j + 1;
                }
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }

    if partial {
        out
    } else {
        format!("\\A(?:{})\\z", out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use rstest::rstest;

    fn compile(pattern: &str, partial: bool) -> Regex {
        Regex::new(&glob_to_regex(pattern, partial)).unwrap()
    }

    #[rstest]
    #[case("*.txt", "notes.txt", true)]
    #[case("*.txt", "notes.txt.bak", false)]
    #[case("*.txt", "dir/notes.txt", true)] // globs see names, not paths
    #[case("data_?", "data_1", true)]
    #[case("data_?", "data_10", false)]
    #[case("set[12]", "set1", true)]
    #[case("set[12]", "set3", false)]
    #[case("set[!12]", "set3", true)]
    #[case("set[!12]", "set1", false)]
    #[case("a.b", "a.b", true)]
    #[case("a.b", "axb", false)] // '.' is literal in globs
    fn test_full_match_translation(#[case] glob: &str, #[case] name: &str, #[case] hit: bool) {
        assert_eq!(compile(glob, false).is_match(name), hit);
    }

    #[test]
    fn test_partial_translation_is_unanchored() {
        let re = compile("tile_*", true);
        assert!(re.is_match("x_tile_0042_y"));
        let re = compile("tile_*", false);
        assert!(!re.is_match("x_tile_0042_y"));
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        let re = compile("a[b", false);
        assert!(re.is_match("a[b"));
        assert!(!re.is_match("ab"));
    }
}
