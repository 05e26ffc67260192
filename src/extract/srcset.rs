//! WHATWG `srcset` parsing (`spec.md` §4.2, §8 item 8), ported from
//! `examples/original_source/linkcheck/htmlutil/srcsetparse.py`, itself a
//! port of the WHatWG "parse a srcset attribute" algorithm
//! (<https://html.spec.whatwg.org/multipage/images.html#parsing-a-srcset-attribute>).

use std::sync::LazyLock;

use regex::Regex;

static DESCRIPTOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?[xw]$").unwrap());

struct Candidate {
    url: String,
    descriptors: Vec<String>,
}

/// Splitting loop + descriptor tokenizer, spec-faithful: a comma inside
/// an unclosed `(...)` run does not end the current candidate's
/// descriptor list. A candidate whose descriptor doesn't match a valid
/// width/density form (`\d+w` / `\d+(\.\d+)?x`) is dropped entirely —
/// this is what makes the `data:,a ( , data:,b 1x, ), data:,c` vector
/// collapse to just `data:,c` (§8 item 8 / S6).
fn tokenize(input: &str) -> Vec<Candidate> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let mut candidates = Vec::new();

    loop {
        // splitting loop: skip whitespace and commas
        while i < len && (chars[i].is_whitespace() || chars[i] == ',') {
            i += 1;
        }
        if i >= len {
            break;
        }

        let url_start = i;
        while i < len && !chars[i].is_whitespace() {
            i += 1;
        }
        let mut url: String = chars[url_start..i].iter().collect();

        if url.ends_with(',') {
            url = url.trim_end_matches(',').to_string();
            candidates.push(Candidate {
                url,
                descriptors: Vec::new(),
            });
            continue;
        }

        // descriptor tokenizer
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        let mut descriptors = Vec::new();
        let mut current = String::new();
        let mut in_parens = false;
        let mut ended_on_comma = false;

        while i < len {
            let c = chars[i];
            if in_parens {
                current.push(c);
                i += 1;
                if c == ')' {
                    in_parens = false;
                }
                continue;
            }
            match c {
                '(' => {
                    current.push(c);
                    in_parens = true;
                    i += 1;
                }
                ',' => {
                    i += 1;
                    ended_on_comma = true;
                    break;
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        descriptors.push(std::mem::take(&mut current));
                    }
                    i += 1;
                    // "after descriptor": skip whitespace, then continue
                    while i < len && chars[i].is_whitespace() {
                        i += 1;
                    }
                }
                _ => {
                    current.push(c);
                    i += 1;
                }
            }
        }
        if !current.is_empty() {
            descriptors.push(current);
        }
        let _ = ended_on_comma;

        candidates.push(Candidate { url, descriptors });
    }

    candidates
}

/// Parse a `srcset` attribute value and return the URL of every candidate
/// whose descriptors (if any) are all valid width/density descriptors.
pub(crate) fn parse_srcset(input: &str) -> Vec<String> {
    tokenize(input)
        .into_iter()
        .filter(|c| c.descriptors.iter().all(|d| DESCRIPTOR_RE.is_match(d)))
        .map(|c| c.url)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_density_descriptors() {
        assert_eq!(
            parse_srcset("data:,a 1x, data:,b 2x"),
            vec!["data:,a", "data:,b"]
        );
    }

    #[test]
    fn width_descriptor() {
        assert_eq!(parse_srcset("data:,a 1w"), vec!["data:,a"]);
    }

    #[test]
    fn commas_inside_descriptor_parens_are_not_separators() {
        assert_eq!(
            parse_srcset("data:,a ( , data:,b 1x, ), data:,c"),
            vec!["data:,c"]
        );
    }

    #[test]
    fn single_url_no_descriptor() {
        assert_eq!(parse_srcset("data:,only"), vec!["data:,only"]);
    }
}
