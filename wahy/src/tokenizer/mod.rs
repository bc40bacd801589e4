pub mod keys;

use self::keys::{BLOCK_CONTROL, NOUNS, THREE_WORD_PREFIXES, VERBS};

/// A single command argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub text: String,
    /// True when the argument was written as a `"..."` literal.
    pub quoted: bool,
}

impl Arg {
    pub fn bare(text: impl Into<String>) -> Self {
        Arg {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Arg {
            text: text.into(),
            quoted: true,
        }
    }
}

/// A tokenized line: the command key and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// One to three words joined by single spaces. Empty when the line
    /// starts with a quoted literal.
    pub key: String,
    pub args: Vec<Arg>,
    /// The trimmed line, for commands that pass source text through.
    line: String,
    /// Byte offset in `line` where each argument starts (at its opening
    /// quote when quoted).
    arg_starts: Vec<usize>,
}

impl ParsedCommand {
    /// Argument text at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|a| a.text.as_str())
    }

    /// Argument text at `index`, or `default` when it is missing or empty.
    pub fn arg_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        match self.arg(index) {
            Some(text) if !text.is_empty() => text,
            _ => default,
        }
    }

    /// All argument texts from `from` onwards, joined by single spaces.
    pub fn joined(&self, from: usize) -> String {
        self.args
            .iter()
            .skip(from)
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Source text from argument `index` to the end of the line, exactly as
    /// written, quotes and spacing included. Empty when there is no such
    /// argument.
    pub fn raw_from(&self, index: usize) -> &str {
        self.arg_starts
            .get(index)
            .map(|&start| &self.line[start..])
            .unwrap_or("")
    }

    /// Like [`joined`](Self::joined), falling back to `default` when empty.
    pub fn joined_or(&self, from: usize, default: &str) -> String {
        let joined = self.joined(from);
        if joined.is_empty() {
            default.to_string()
        } else {
            joined
        }
    }
}

/// Tokenize one line of Wahy source.
///
/// Returns `None` for blank lines and for comments (`#` or `//`). Never
/// fails: an unmatched `"` is kept as an ordinary character.
pub fn tokenize(line: &str) -> Option<ParsedCommand> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return None;
    }

    let (mut words, mut starts) = split_words(line);
    if words.is_empty() {
        return None;
    }

    let arity = key_arity(&words);
    let args = words.split_off(arity);
    let arg_starts = starts.split_off(arity);
    let key = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Some(ParsedCommand {
        key,
        args,
        line: line.to_string(),
        arg_starts,
    })
}

/// Split on whitespace, lifting each paired `"..."` out as one literal
/// argument with its embedded spaces intact. Returns the words and the byte
/// offset each one starts at.
fn split_words(line: &str) -> (Vec<Arg>, Vec<usize>) {
    let mut words = Vec::new();
    let mut starts = Vec::new();
    let mut current = String::new();
    let mut current_start = 0;
    let mut resume_at = 0;

    for (i, c) in line.char_indices() {
        if i < resume_at {
            continue;
        }
        let closing = if c == '"' { line[i + 1..].find('"') } else { None };
        match closing {
            Some(len) => {
                flush_word(&mut current, current_start, &mut words, &mut starts);
                words.push(Arg::quoted(&line[i + 1..i + 1 + len]));
                starts.push(i);
                resume_at = i + len + 2;
            }
            None if c.is_whitespace() => {
                flush_word(&mut current, current_start, &mut words, &mut starts)
            }
            None => {
                if current.is_empty() {
                    current_start = i;
                }
                current.push(c);
            }
        }
    }
    flush_word(&mut current, current_start, &mut words, &mut starts);

    (words, starts)
}

fn flush_word(current: &mut String, start: usize, words: &mut Vec<Arg>, starts: &mut Vec<usize>) {
    if !current.is_empty() {
        words.push(Arg::bare(std::mem::take(current)));
        starts.push(start);
    }
}

/// Number of leading words that make up the command key. First match wins:
/// verb + noun, then three-word prefix, then block control, then one word.
/// Quoted literals never take part in a key.
fn key_arity(words: &[Arg]) -> usize {
    let bare = |index: usize| {
        words
            .get(index)
            .filter(|w| !w.quoted)
            .map(|w| w.text.as_str())
    };

    let Some(first) = bare(0) else {
        return 0;
    };

    if VERBS.contains(&first) && bare(1).is_some_and(|w| NOUNS.contains(&w)) {
        return 2;
    }

    if THREE_WORD_PREFIXES.contains(&first) && bare(1).is_some() && bare(2).is_some() {
        return 3;
    }

    if BLOCK_CONTROL.contains(&first) {
        return if bare(1).is_some() { 2 } else { 1 };
    }

    1
}
