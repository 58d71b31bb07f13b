/// How a CSS value is cut into parts and glued back together.
///
/// Splitting never cuts inside parentheses or quotes, so `rgba(0, 0, 0, .5)`
/// stays one token under both the whitespace and the comma separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    delimiter: Delimiter,
    join: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Whitespace,
    Char(char),
}

impl Default for Separator {
    fn default() -> Self {
        Separator::whitespace()
    }
}

impl Separator {
    pub fn whitespace() -> Self {
        Separator {
            delimiter: Delimiter::Whitespace,
            join: " ".to_string(),
        }
    }

    pub fn comma() -> Self {
        Separator {
            delimiter: Delimiter::Char(','),
            join: ", ".to_string(),
        }
    }

    /// `" "` splits on whitespace; anything else splits on its first
    /// non-blank character and joins with the text as given (`","` joins with `", "`).
    pub fn new(text: &str) -> Self {
        match text.trim().chars().next() {
            None => Separator::whitespace(),
            Some(',') if text == "," => Separator::comma(),
            Some(ch) => Separator {
                delimiter: Delimiter::Char(ch),
                join: text.to_string(),
            },
        }
    }

    pub fn join_str(&self) -> &str {
        &self.join
    }

    /// Trimmed parts of `value`. Blank input has no parts.
    pub fn split(&self, value: &str) -> Vec<String> {
        if value.trim().is_empty() {
            return Vec::new();
        }

        let mut parts = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        for ch in value.chars() {
            if let Some(q) = quote {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
                continue;
            }
            let at_delimiter = depth == 0
                && match self.delimiter {
                    Delimiter::Whitespace => ch.is_whitespace(),
                    Delimiter::Char(d) => ch == d,
                };
            if at_delimiter {
                self.push_part(&mut parts, &current);
                current.clear();
                continue;
            }
            match ch {
                '"' | '\'' => quote = Some(ch),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
            current.push(ch);
        }
        self.push_part(&mut parts, &current);
        parts
    }

    fn push_part(&self, parts: &mut Vec<String>, part: &str) {
        let part = part.trim();
        // Runs of whitespace are a single delimiter
        if self.delimiter == Delimiter::Whitespace && part.is_empty() {
            return;
        }
        parts.push(part.to_string());
    }

    pub fn join<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push_str(&self.join);
            }
            out.push_str(part.as_ref());
        }
        out
    }
}
