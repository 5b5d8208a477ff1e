//! Content-line scanning.
//!
//! Splits calendar text into logical lines (undoing line folding) and each
//! logical line into its name, parameters and value.

/// One unfolded `NAME;PARAM=VALUE:value` line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ContentLine {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub value: String,
}

impl ContentLine {
    /// Split a logical line at the first `:` outside a quoted parameter value.
    /// Lines without a `:` are not content lines.
    pub fn parse(line: &str) -> Option<Self> {
        let mut in_quotes = false;
        let mut colon = None;
        for (i, c) in line.char_indices() {
            match c {
                '"' => in_quotes = !in_quotes,
                ':' if !in_quotes => {
                    colon = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let colon = colon?;
        let (head, value) = (&line[..colon], &line[colon + 1..]);

        let mut parts = split_unquoted(head, ';').into_iter();
        let name = parts.next()?.trim().to_ascii_uppercase();
        if name.is_empty() {
            return None;
        }

        let params = parts
            .filter_map(|p| {
                let (key, val) = p.split_once('=')?;
                Some((
                    key.trim().to_ascii_uppercase(),
                    val.trim().trim_matches('"').to_string(),
                ))
            })
            .collect();

        Some(ContentLine {
            name,
            params,
            value: value.to_string(),
        })
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// `BEGIN:<component>` / `END:<component>` markers.
    pub fn component_marker(&self) -> Option<Marker> {
        let vevent = self.value.trim().eq_ignore_ascii_case("VEVENT");
        match self.name.as_str() {
            "BEGIN" => Some(Marker::Begin { vevent }),
            "END" => Some(Marker::End { vevent }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    Begin { vevent: bool },
    End { vevent: bool },
}

/// Join folded lines back together.
///
/// A physical line starting with a single space or tab continues the previous
/// line; the line break and that one whitespace character are removed.
/// Accepts both `\r\n` and bare `\n` line endings.
pub(crate) fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for physical in text.split('\n') {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);

        let continuation = physical
            .strip_prefix(' ')
            .or_else(|| physical.strip_prefix('\t'));

        match (continuation, lines.last_mut()) {
            (Some(rest), Some(previous)) => previous.push_str(rest),
            _ => lines.push(physical.to_string()),
        }
    }

    lines
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}
