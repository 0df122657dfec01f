// ABOUTME: Version info and REPL banner text

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "Lox Interpreter v0.1.0";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for Lox";

#[allow(dead_code)]
pub const HELP_TEXT: &str = r#"
Type any Lox statement to evaluate it, terminated with ';'.
Use Ctrl-D to exit.
"#;
