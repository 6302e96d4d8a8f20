use std::io::{ErrorKind, Write};
use std::process::{ChildStdin, Command, Stdio};

use thiserror::Error;

use super::Syntax;

/// Parser invocation used when none is configured. The command reads source
/// text on stdin and prints an ESTree tree with offsets on stdout.
pub const DEFAULT_PARSER_COMMAND: &str = "acorn --ecma2022 --module --locations";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parser command is empty")]
    EmptyCommand,
    #[error("failed to run parser `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("syntax error: {message}")]
    Syntax { message: String },
    #[error("parser output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parser output is not a syntax tree: {0}")]
    InvalidTree(String),
}

/// Produces a syntax tree for a piece of source text, or reports why it can't.
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<Syntax, ParseError>;
}

/// Runs an external ESTree-producing parser as a child process.
#[derive(Clone, Debug)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    pub fn from_command_line(command_line: &str) -> Result<Self, ParseError> {
        let mut parts = command_line.split_whitespace().map(str::to_owned);
        let program = parts.next().ok_or(ParseError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn spawn_error(&self, source: std::io::Error) -> ParseError {
        ParseError::Spawn {
            command: self.command_line(),
            source,
        }
    }
}

impl SourceParser for CommandParser {
    fn parse(&self, source: &str) -> Result<Syntax, ParseError> {
        tracing::debug!(command = %self.command_line(), bytes = source.len(), "running parser");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| self.spawn_error(error))?;

        // Stdin is fed from its own thread while stdout and stderr drain, so a
        // parser that streams output before reading all input cannot stall on
        // a full pipe.
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || write_source(stdin, source));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });
        let output = output.map_err(|error| self.spawn_error(error))?;
        written.map_err(|error| self.spawn_error(error))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("parser exited with {}", output.status),
                text => text.to_owned(),
            };
            return Err(ParseError::Syntax { message });
        }

        let raw = String::from_utf8(output.stdout)
            .map_err(|_| ParseError::InvalidTree("output was not valid UTF-8".to_owned()))?;
        parse_estree_json(&raw)
    }
}

/// A parser that bails out early may close stdin before reading it all; its
/// exit status carries the real outcome, so a broken pipe is not an error.
fn write_source(stdin: Option<ChildStdin>, source: &str) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(source.as_bytes()) {
        Err(error) if error.kind() != ErrorKind::BrokenPipe => Err(error),
        _ => Ok(()),
    }
}

pub fn parse_estree_json(raw: &str) -> Result<Syntax, ParseError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    Syntax::from_estree(&value).ok_or_else(|| {
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("untyped value");
        ParseError::InvalidTree(format!("expected a Program node, found {kind}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_is_split_on_whitespace() {
        let parser = CommandParser::from_command_line("  acorn   --module --locations ").unwrap();
        assert_eq!(parser.program, "acorn");
        assert_eq!(parser.args, vec!["--module", "--locations"]);
        assert_eq!(parser.command_line(), "acorn --module --locations");
    }

    #[test]
    fn empty_command_line_is_rejected() {
        assert!(matches!(
            CommandParser::from_command_line("   "),
            Err(ParseError::EmptyCommand)
        ));
    }

    #[test]
    fn json_that_is_not_a_program_is_invalid() {
        let error = parse_estree_json(r#"{"type":"Identifier","name":"x"}"#).unwrap_err();
        assert!(matches!(error, ParseError::InvalidTree(_)));
        assert!(error.to_string().contains("Identifier"));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            parse_estree_json("{not json"),
            Err(ParseError::Json(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_output_is_read_as_estree() {
        // `cat` echoes stdin, so feeding it a tree stands in for a real parser.
        let parser = CommandParser::from_command_line("cat").unwrap();
        let tree = parser.parse(r#"{"type":"Program","body":[]}"#).unwrap();
        assert_eq!(tree, Syntax::Program { body: Vec::new() });
    }

    #[cfg(unix)]
    #[test]
    fn large_input_is_fed_while_output_drains() {
        // Well past a pipe buffer in both directions; `cat` writes as it reads.
        let statement = r#"{"type":"ExpressionStatement","expression":{"type":"Identifier","name":"x"}}"#;
        let body = vec![statement; 4_000].join(",");
        let input = format!(r#"{{"type":"Program","body":[{body}]}}"#);
        assert!(input.len() > 256 * 1024);

        let parser = CommandParser::from_command_line("cat").unwrap();
        let Syntax::Program { body } = parser.parse(&input).unwrap() else {
            panic!("program expected");
        };
        assert_eq!(body.len(), 4_000);
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_a_syntax_error() {
        let parser = CommandParser::from_command_line("false").unwrap();
        assert!(matches!(
            parser.parse("let = ;"),
            Err(ParseError::Syntax { .. })
        ));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let parser =
            CommandParser::from_command_line("codegraph3d-no-such-parser-binary").unwrap();
        assert!(matches!(parser.parse(""), Err(ParseError::Spawn { .. })));
    }
}
