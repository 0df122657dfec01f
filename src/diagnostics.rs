// ABOUTME: Injected diagnostic sink shared by the lexer, parser, and interpreter
// Not a process-wide static: callers own one, so a REPL line and a test run never share error state.

use std::io::Write;

pub struct Diagnostics<W: Write> {
    out: W,
    had_parse_error: bool,
    had_runtime_error: bool,
}

impl<W: Write> Diagnostics<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            had_parse_error: false,
            had_runtime_error: false,
        }
    }

    pub fn had_parse_error(&self) -> bool {
        self.had_parse_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset(&mut self) {
        self.had_parse_error = false;
        self.had_runtime_error = false;
    }

    /// Lexical/parse-time error: `[<line>] Error <where>: <message>`
    pub fn report_parse(&mut self, line: usize, location: &str, message: &str) {
        let _ = writeln!(self.out, "[{line}] Error {location}: {message}");
        self.had_parse_error = true;
    }

    /// Runtime error: `[line <line>] <message>`
    pub fn report_runtime(&mut self, line: usize, message: &str) {
        let _ = writeln!(self.out, "[line {line}] {message}");
        self.had_runtime_error = true;
    }
}
