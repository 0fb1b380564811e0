use crate::lang::LineNumber;

/// What a line typed at the shell turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank or a `#` comment.
    Empty,
    /// A program line edit. Empty content deletes the line.
    Numbered { number: LineNumber, content: String },
    /// A named command. The name is upper case, quotes are stripped from
    /// the arguments.
    Command { name: String, args: Vec<String> },
}

/// Split a raw input line. Command names are not validated here.
pub fn classify(text: &str) -> Input {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Input::Empty;
    }
    let first_end = text.find(char::is_whitespace).unwrap_or_else(|| text.len());
    let first = &text[..first_end];
    if first.bytes().all(|b| b.is_ascii_digit()) {
        // Too many digits for a LineNumber saturates so the range check
        // downstream rejects it.
        let number = first.parse::<LineNumber>().unwrap_or(LineNumber::MAX);
        let mut content = &text[first_end..];
        if content.starts_with(' ') {
            content = &content[1..];
        }
        return Input::Numbered {
            number,
            content: content.to_string(),
        };
    }
    Input::Command {
        name: first.to_ascii_uppercase(),
        args: split_args(&text[first_end..]),
    }
}

/// Whitespace separated words; a double quoted word may hold spaces and
/// runs to the end of the line when the closing quote is missing.
fn split_args(s: &str) -> Vec<String> {
    let mut args = vec![];
    let mut chars = s.chars().peekable();
    loop {
        while let Some(ch) = chars.peek() {
            if ch.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }
        let mut arg = String::new();
        match chars.peek() {
            None => return args,
            Some('"') => {
                chars.next();
                for ch in &mut chars {
                    if ch == '"' {
                        break;
                    }
                    arg.push(ch);
                }
            }
            Some(_) => {
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() {
                        break;
                    }
                    arg.push(ch);
                    chars.next();
                }
            }
        }
        args.push(arg);
    }
}
