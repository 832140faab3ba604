//! SVG path data tokenizer.
//!
//! Lexes a path `d` attribute into `(command, fixed-arity argument list)`
//! records. Handles comma/whitespace separation, scientific notation, unary
//! signs that begin a new number without a separator (`L10-5` is `L 10 -5`),
//! and implicit command repetition (`M` repeats continue as `L`). A trailing
//! command with too few arguments is dropped so a damaged path still renders
//! partially.

use tracing::debug;

/// One path command with its full, fixed-length argument tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct PathToken {
    pub cmd: char,
    pub args: Vec<f64>,
}

impl PathToken {
    pub fn new(cmd: char, args: Vec<f64>) -> Self {
        Self { cmd, args }
    }
}

/// Number of arguments each command consumes per call.
fn arity(cmd: char) -> Option<usize> {
    match cmd.to_ascii_uppercase() {
        'M' | 'L' | 'T' => Some(2),
        'H' | 'V' => Some(1),
        'C' => Some(6),
        'S' | 'Q' => Some(4),
        'A' => Some(7),
        'Z' => Some(0),
        _ => None,
    }
}

/// The command an implicit repeat group belongs to: `M`/`m` repeats become
/// `L`/`l`, everything else repeats as itself.
fn repeat_command(cmd: char) -> char {
    match cmd {
        'M' => 'L',
        'm' => 'l',
        other => other,
    }
}

enum RawToken {
    Command(char),
    Number(f64),
}

/// Split path text into command letters and numbers.
///
/// Commas and whitespace separate tokens; a `+`/`-` begins a new number
/// unless it directly follows an `e`/`E` exponent marker.
fn lex(path_data: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String, tokens: &mut Vec<RawToken>| {
        if current.is_empty() {
            return;
        }
        match current.parse::<f64>() {
            Ok(value) if value.is_finite() => tokens.push(RawToken::Number(value)),
            _ => debug!(token = current.as_str(), "dropping unparseable path token"),
        }
        current.clear();
    };

    for ch in path_data.chars() {
        match ch {
            ' ' | ',' | '\n' | '\r' | '\t' => flush(&mut current, &mut tokens),
            '-' | '+' => {
                if !current.is_empty() && !matches!(current.chars().last(), Some('e' | 'E')) {
                    flush(&mut current, &mut tokens);
                }
                current.push(ch);
            }
            // An exponent marker continues the number it follows; every
            // other letter is a command boundary.
            'e' | 'E'
                if current
                    .chars()
                    .last()
                    .is_some_and(|c| c.is_ascii_digit() || c == '.') =>
            {
                current.push(ch)
            }
            c if c.is_ascii_alphabetic() => {
                flush(&mut current, &mut tokens);
                tokens.push(RawToken::Command(c));
            }
            _ => current.push(ch),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

/// Tokenize a path `d` string into per-call command records.
///
/// Implicit repeats are expanded into their own records, and any dangling
/// command whose argument group is incomplete is dropped silently.
pub fn tokenize_path(path_data: &str) -> Vec<PathToken> {
    let raw = lex(path_data);
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < raw.len() {
        let cmd = match raw[i] {
            RawToken::Command(c) => c,
            RawToken::Number(_) => {
                // Numbers with no governing command; skip to the next command.
                debug!("dropping stray numeric arguments with no command");
                i += 1;
                continue;
            }
        };
        i += 1;

        let Some(arity) = arity(cmd) else {
            debug!(command = %cmd, "dropping unknown path command");
            while matches!(raw.get(i), Some(RawToken::Number(_))) {
                i += 1;
            }
            continue;
        };

        if arity == 0 {
            tokens.push(PathToken::new(cmd, Vec::new()));
            continue;
        }

        let mut effective = cmd;
        loop {
            let mut args = Vec::with_capacity(arity);
            while args.len() < arity {
                match raw.get(i) {
                    Some(RawToken::Number(n)) => {
                        args.push(*n);
                        i += 1;
                    }
                    _ => break,
                }
            }
            if args.len() < arity {
                if !args.is_empty() {
                    debug!(
                        command = %effective,
                        got = args.len(),
                        expected = arity,
                        "dropping dangling path command"
                    );
                }
                break;
            }
            tokens.push(PathToken::new(effective, args));
            effective = repeat_command(effective);

            // Stop repeating once the next token is not a number.
            if !matches!(raw.get(i), Some(RawToken::Number(_))) {
                break;
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_commands_and_arity() {
        let tokens = tokenize_path("M 10 20 L 30 40 Z");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], PathToken::new('M', vec![10.0, 20.0]));
        assert_eq!(tokens[1], PathToken::new('L', vec![30.0, 40.0]));
        assert_eq!(tokens[2], PathToken::new('Z', vec![]));
    }

    #[test]
    fn unary_minus_without_separator() {
        let tokens = tokenize_path("L10-5");
        assert_eq!(tokens, vec![PathToken::new('L', vec![10.0, -5.0])]);
    }

    #[test]
    fn scientific_notation_keeps_exponent_sign() {
        let tokens = tokenize_path("L 1e-2 2.5E+1");
        assert_eq!(tokens, vec![PathToken::new('L', vec![0.01, 25.0])]);
    }

    #[test]
    fn implicit_moveto_repeats_as_lineto() {
        let tokens = tokenize_path("M 0 0 10 0 10 10");
        assert_eq!(
            tokens,
            vec![
                PathToken::new('M', vec![0.0, 0.0]),
                PathToken::new('L', vec![10.0, 0.0]),
                PathToken::new('L', vec![10.0, 10.0]),
            ]
        );
    }

    #[test]
    fn relative_moveto_repeats_as_relative_lineto() {
        let tokens = tokenize_path("m 1 1 2 0");
        assert_eq!(
            tokens,
            vec![
                PathToken::new('m', vec![1.0, 1.0]),
                PathToken::new('l', vec![2.0, 0.0]),
            ]
        );
    }

    #[test]
    fn curve_repeats_as_itself() {
        let tokens = tokenize_path("C 1 1 2 2 3 3 4 4 5 5 6 6");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].cmd, 'C');
        assert_eq!(tokens[1].cmd, 'C');
    }

    #[test]
    fn dangling_command_is_dropped() {
        let tokens = tokenize_path("M 0 0 L 10 10 L 5");
        assert_eq!(
            tokens,
            vec![
                PathToken::new('M', vec![0.0, 0.0]),
                PathToken::new('L', vec![10.0, 10.0]),
            ]
        );
    }

    #[test]
    fn commas_and_mixed_whitespace() {
        let tokens = tokenize_path("M0,0\n\tL ,10 ,  20");
        assert_eq!(
            tokens,
            vec![
                PathToken::new('M', vec![0.0, 0.0]),
                PathToken::new('L', vec![10.0, 20.0]),
            ]
        );
    }

    #[test]
    fn stray_numbers_before_any_command_are_dropped() {
        let tokens = tokenize_path("5 5 M 1 2");
        assert_eq!(tokens, vec![PathToken::new('M', vec![1.0, 2.0])]);
    }

    #[test]
    fn unknown_commands_are_dropped() {
        let tokens = tokenize_path("M 0 0 B 1 2 L 3 4");
        // `B` is unknown; it is dropped together with its arguments.
        assert_eq!(
            tokens,
            vec![
                PathToken::new('M', vec![0.0, 0.0]),
                PathToken::new('L', vec![3.0, 4.0]),
            ]
        );
    }
}
