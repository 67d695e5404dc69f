use std::mem;
use std::str;

/// A block is the raw material of one entry in a `.bib` file.
/// Given the source
///
/// ```tex
/// @Book{works:4,
///   author     = {Shakespeare, William},
///   title      = {Sonnets},
/// }
/// ```
///
/// the lexer emits one `Block` with kind `book` and the text between the
/// outermost braces as body. Splitting the body into ID and fields is
/// left to the parser.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Block {
    pub(crate) kind: String,
    pub(crate) body: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LexingState {
    Wait,
    Type,
    Skip,
    Data,
}

/// Removes a trailing `%` comment from every line of `src` and joins
/// the lines with a single space. A `%` only starts a comment outside
/// of double quotes and outside of any braces opened on the same line.
pub(crate) fn strip_comments(src: &str) -> String {
    src.split('\n')
        .map(strip_line_comment)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_line_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut braces: i32 = 0;
    for (idx, chr) in line.char_indices() {
        match chr {
            '"' => in_quotes = !in_quotes,
            '{' => braces += 1,
            '}' => braces -= 1,
            '%' if !in_quotes && braces == 0 => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// A stateful iterator yielding one `Block` after another.
/// It only keeps the body currently read and never looks back.
pub(crate) struct LexingIterator<'s> {
    pub(crate) src: str::Chars<'s>,
    pub(crate) state: LexingState,
    pub(crate) previous_state: LexingState, // where to continue after a comment
    pub(crate) kind: String,                // entry type read so far, e.g. “book”
    pub(crate) body: String,                // accumulates everything between the outer braces
    pub(crate) curlybrace_level: usize,     // inside how many levels of curly braces of the body are we?
}

impl<'s> LexingIterator<'s> {
    pub(crate) fn new(src: &'s str) -> LexingIterator<'s> {
        LexingIterator {
            src: src.chars(),
            state: LexingState::Wait,
            previous_state: LexingState::Wait,
            kind: String::new(),
            body: String::new(),
            curlybrace_level: 0,
        }
    }

    fn skip_comment(&mut self) {
        self.previous_state = self.state;
        self.state = LexingState::Skip;
    }

    fn open(&mut self) {
        self.body.clear();
        self.curlybrace_level = 0;
        self.state = LexingState::Data;
    }
}

impl<'s> Iterator for LexingIterator<'s> {
    type Item = Block;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(chr) = self.src.next() {
            match self.state {
                LexingState::Skip => {
                    if chr == '\n' {
                        self.state = self.previous_state;
                    }
                }
                // expecting '@' or an anonymous '{'
                LexingState::Wait => {
                    if chr == '@' {
                        self.kind.clear();
                        self.state = LexingState::Type;
                    } else if chr == '{' {
                        self.open();
                    } else if chr == '%' {
                        self.skip_comment();
                    } else if !chr.is_whitespace() {
                        // a bare “@word” followed by anything but '{': the
                        // pending type is dropped, so “@foo bar {” is untyped
                        self.kind.clear();
                    }
                }
                // expecting entry type, e.g. “book”
                LexingState::Type => {
                    if chr.is_alphabetic() {
                        self.kind.extend(chr.to_lowercase());
                    } else if chr.is_whitespace() {
                        self.state = LexingState::Wait;
                    } else if chr == '{' {
                        self.open();
                    } else if chr == '%' {
                        self.skip_comment();
                    }
                }
                LexingState::Data => {
                    if chr == '{' {
                        self.curlybrace_level += 1;
                        self.body.push(chr);
                    } else if chr == '}' {
                        if self.curlybrace_level == 0 {
                            self.state = LexingState::Wait;
                            return Some(Block {
                                kind: mem::take(&mut self.kind),
                                body: mem::take(&mut self.body),
                            });
                        }
                        self.curlybrace_level -= 1;
                        self.body.push(chr);
                    } else {
                        self.body.push(chr);
                    }
                }
            }
        }

        // an unterminated entry at the end of the source is dropped
        None
    }
}
