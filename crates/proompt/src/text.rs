//! Small text helpers for section formatters.

/// Remove the whitespace prefix common to every non-blank line.
///
/// Blank lines don't participate in the common prefix and come back empty.
///
/// ```
/// use proompt::text::dedent;
///
/// let text = "    ## Report\n      - revenue\n\n    done";
/// assert_eq!(dedent(text), "## Report\n  - revenue\n\ndone");
/// ```
pub fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.strip_suffix(l.trim_start()).unwrap_or(""))
        .reduce(common_prefix)
        .unwrap_or("");

    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.strip_prefix(margin).unwrap_or(l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map_or(0, |((i, c), _)| i + c.len_utf8());
    a.get(..len).unwrap_or("")
}

/// Prefix every non-blank line with `prefix`.
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                l.to_string()
            } else {
                format!("{prefix}{l}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `- item` lines.
pub fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|i| format!("- {}", i.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
