//! Line-oriented parser for `DEF_SYSCALL` tables.
//!
//! Declaration grammar, one per physical line (multi-line declarations are
//! not supported):
//!
//! ```text
//! DEF_SYSCALL(0x3, read, long, 3, uint32_t fd, void *msg, uint32_t size)
//! DEF_SYSCALL(4, exit_group, long, 0)
//! ```
//!
//! Lines that do not start with `DEF_SYSCALL` after trimming (blank lines,
//! comments, other macros) are skipped. A line that does start with it must
//! match the grammar in full and satisfy the argument-count contract, or the
//! whole run fails: a stub file that silently dropped a syscall would be far
//! worse than a failed build.

use thiserror::Error;

/// Keyword that opens every declaration line.
pub const SYSCALL_DEF: &str = "DEF_SYSCALL";

/// Stubs pass arguments in r0-r3, so anything past four has no register.
pub const MAX_ARGS: usize = 4;

/// One validated table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyscallRecord {
    /// Parsed value of the numeric literal.
    pub number: u64,
    /// The literal exactly as written; emission reuses it so a hex number
    /// stays hex in the generated define.
    pub number_lit: String,
    /// Bare identifier, used as the C symbol, the assembly label and the
    /// `__NR_<name>` macro suffix.
    pub name: String,
    /// Raw return type text, trimmed, not type-checked.
    pub return_type: String,
    /// Declared argument count, in `0..=MAX_ARGS`.
    pub arg_count: usize,
    /// Trimmed `"type name"` parameter strings; empty when `arg_count` is 0.
    pub args: Vec<String>,
}

impl SyscallRecord {
    /// Parameter list as it appears in the C prototype.
    pub fn c_args(&self) -> String {
        if self.args.is_empty() {
            "void".to_owned()
        } else {
            self.args.join(", ")
        }
    }
}

/// Why a declaration line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("declaration does not match the DEF_SYSCALL grammar: {0}")]
    Grammar(&'static str),
    #[error("only syscalls with up to 4 arguments are supported")]
    ArgCountCeiling,
    #[error("too many arguments supplied")]
    TooManyArgs,
    #[error("too few arguments supplied")]
    TooFewArgs,
}

/// A [`ParseError`] tied to the offending source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("error processing line {line_no}: {line}")]
pub struct TableError {
    /// 1-based line number in the table file.
    pub line_no: usize,
    /// The offending line, trimmed.
    pub line: String,
    #[source]
    pub source: ParseError,
}

/// Parse one table line.
///
/// `Ok(None)` means the line is not a declaration and contributes nothing.
/// `Err` means the line claims to be a declaration but is malformed; callers
/// must treat this as fatal for the whole table.
pub fn parse_line(line: &str) -> Result<Option<SyscallRecord>, ParseError> {
    let line = line.trim();
    if !line.starts_with(SYSCALL_DEF) {
        return Ok(None);
    }
    parse_decl(&line[SYSCALL_DEF.len()..]).map(Some)
}

/// Parse a whole table, preserving declaration order.
///
/// Stops at the first bad declaration; there is deliberately no recovery.
pub fn parse_table(source: &str) -> Result<Vec<SyscallRecord>, TableError> {
    let mut records = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        match parse_line(raw) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(source) => {
                return Err(TableError {
                    line_no: idx + 1,
                    line: raw.trim().to_owned(),
                    source,
                })
            }
        }
    }
    Ok(records)
}

/// Everything after the `DEF_SYSCALL` keyword.
fn parse_decl(rest: &str) -> Result<SyscallRecord, ParseError> {
    let mut sc = Scanner::new(rest);

    sc.expect('(', "expected '(' after DEF_SYSCALL")?;

    let number_lit = sc.take_word();
    let number = parse_number(number_lit)?;
    sc.expect(',', "expected ',' after the syscall number")?;

    let name = sc.take_word();
    if name.is_empty() {
        return Err(ParseError::Grammar("missing syscall name"));
    }
    sc.expect(',', "expected ',' after the syscall name")?;

    let return_type = sc.take_type_tokens().trim();
    if return_type.is_empty() {
        return Err(ParseError::Grammar("missing return type"));
    }
    sc.expect(',', "expected ',' after the return type")?;

    let argc_lit = sc.take_word();
    if argc_lit.is_empty() || !argc_lit.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Grammar("argument count is not a decimal number"));
    }
    // A count too wide for usize is certainly over the ceiling.
    let arg_count: usize = argc_lit.parse().map_err(|_| ParseError::ArgCountCeiling)?;

    let args_text = if sc.eat(',') {
        let text = sc.take_arg_tokens();
        if text.is_empty() {
            return Err(ParseError::Grammar("missing argument list after ','"));
        }
        Some(text)
    } else {
        None
    };

    sc.expect(')', "expected ')' closing the declaration")?;
    if !sc.at_end() {
        return Err(ParseError::Grammar("trailing text after ')'"));
    }

    if arg_count > MAX_ARGS {
        return Err(ParseError::ArgCountCeiling);
    }

    let args = match args_text {
        Some(text) => {
            if arg_count == 0 {
                return Err(ParseError::TooManyArgs);
            }
            let args: Vec<String> = text.split(',').map(|a| a.trim().to_owned()).collect();
            if args.len() > arg_count {
                return Err(ParseError::TooManyArgs);
            }
            if args.len() < arg_count {
                return Err(ParseError::TooFewArgs);
            }
            args
        }
        None => {
            if arg_count > 0 {
                return Err(ParseError::TooFewArgs);
            }
            Vec::new()
        }
    };

    Ok(SyscallRecord {
        number,
        number_lit: number_lit.to_owned(),
        name: name.to_owned(),
        return_type: return_type.to_owned(),
        arg_count,
        args,
    })
}

/// Decimal or `0x`-prefixed hex literal. The prefix is lowercase only.
fn parse_number(lit: &str) -> Result<u64, ParseError> {
    if let Some(hex) = lit.strip_prefix("0x") {
        if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return u64::from_str_radix(hex, 16)
                .map_err(|_| ParseError::Grammar("syscall number does not fit in 64 bits"));
        }
    } else if !lit.is_empty() && lit.bytes().all(|b| b.is_ascii_digit()) {
        return lit
            .parse()
            .map_err(|_| ParseError::Grammar("syscall number does not fit in 64 bits"));
    }
    Err(ParseError::Grammar(
        "syscall number is not a decimal or 0x-prefixed hex literal",
    ))
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Cursor over the remainder of a declaration line.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.rest.is_empty()
    }

    /// Consume `c` (after whitespace) or fail with a grammar error.
    fn expect(&mut self, c: char, reason: &'static str) -> Result<(), ParseError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(ParseError::Grammar(reason))
        }
    }

    /// Consume `c` (after whitespace) if present.
    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// Longest prefix of word characters (`[0-9A-Za-z_]`).
    fn take_word(&mut self) -> &'a str {
        self.skip_ws();
        self.take_while(is_word)
    }

    /// Free-form type text: word characters, `*` and whitespace.
    fn take_type_tokens(&mut self) -> &'a str {
        self.take_while(|c| is_word(c) || c == '*' || c.is_whitespace())
    }

    /// Free-form argument list text: type tokens plus the separating commas.
    /// Whitespace is part of the token, so even a blank list counts as
    /// supplied text (and trips the count check for a zero-argument form).
    fn take_arg_tokens(&mut self) -> &'a str {
        self.take_while(|c| is_word(c) || c == '*' || c == ',' || c.is_whitespace())
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .find(|c| !pred(c))
            .unwrap_or(self.rest.len());
        let (token, rest) = self.rest.split_at(end);
        self.rest = rest;
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_ok(line: &str) -> SyscallRecord {
        parse_line(line).unwrap().expect("line should be a declaration")
    }

    fn parse_err(line: &str) -> ParseError {
        parse_line(line).unwrap_err()
    }

    #[test]
    fn full_declaration() {
        let rec = parse_ok("DEF_SYSCALL(0x3, read, int, 3, int fd, void *buf, int size)");
        assert_eq!(rec.number, 3);
        assert_eq!(rec.number_lit, "0x3");
        assert_eq!(rec.name, "read");
        assert_eq!(rec.return_type, "int");
        assert_eq!(rec.arg_count, 3);
        assert_eq!(rec.args, vec!["int fd", "void *buf", "int size"]);
    }

    #[test]
    fn zero_arg_declaration_renders_void() {
        let rec = parse_ok("DEF_SYSCALL(4, write, int, 0)");
        assert_eq!(rec.number, 4);
        assert_eq!(rec.number_lit, "4");
        assert_eq!(rec.args, Vec::<String>::new());
        assert_eq!(rec.c_args(), "void");
    }

    #[test]
    fn multi_word_return_type() {
        let rec = parse_ok("DEF_SYSCALL(0x10, port_create, unsigned long, 1, const char *path)");
        assert_eq!(rec.return_type, "unsigned long");
        assert_eq!(rec.args, vec!["const char *path"]);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let rec = parse_ok("   DEF_SYSCALL( 0x5 ,  ioctl ,  long , 2 ,  uint32_t fd ,  void *buf )   ");
        assert_eq!(rec.name, "ioctl");
        assert_eq!(rec.args, vec!["uint32_t fd", "void *buf"]);
    }

    #[test]
    fn non_declaration_lines_are_skipped() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("/* comment */").unwrap(), None);
        assert_eq!(parse_line(" * DEF_SYSCALL(nr, name, rt, n, args...)").unwrap(), None);
        assert_eq!(parse_line("#define FOO 1").unwrap(), None);
    }

    #[test]
    fn too_few_arguments() {
        assert_eq!(
            parse_err("DEF_SYSCALL(5, bad, int, 2, int a)"),
            ParseError::TooFewArgs
        );
        // declared some, listed none
        assert_eq!(parse_err("DEF_SYSCALL(5, bad, int, 2)"), ParseError::TooFewArgs);
    }

    #[test]
    fn too_many_arguments() {
        assert_eq!(
            parse_err("DEF_SYSCALL(5, bad, int, 1, int a, int b)"),
            ParseError::TooManyArgs
        );
        // zero declared but a list supplied
        assert_eq!(
            parse_err("DEF_SYSCALL(5, bad, int, 0, int a)"),
            ParseError::TooManyArgs
        );
    }

    #[test]
    fn arg_count_ceiling_wins_over_list_contents() {
        // five arguments actually listed
        assert_eq!(
            parse_err("DEF_SYSCALL(5, bad, int, 5, int a, int b, int c, int d, int e)"),
            ParseError::ArgCountCeiling
        );
        // and also when the list is absent entirely
        assert_eq!(parse_err("DEF_SYSCALL(5, bad, int, 9)"), ParseError::ArgCountCeiling);
    }

    #[test]
    fn grammar_violations() {
        assert!(matches!(parse_err("DEF_SYSCALL"), ParseError::Grammar(_)));
        assert!(matches!(parse_err("DEF_SYSCALLFOO(1, x, int, 0)"), ParseError::Grammar(_)));
        assert!(matches!(parse_err("DEF_SYSCALL(1, x, int, 0) junk"), ParseError::Grammar(_)));
        assert!(matches!(parse_err("DEF_SYSCALL(1, x, int, 0,)"), ParseError::Grammar(_)));
        assert!(matches!(parse_err("DEF_SYSCALL(, x, int, 0)"), ParseError::Grammar(_)));
        assert!(matches!(parse_err("DEF_SYSCALL(1, , int, 0)"), ParseError::Grammar(_)));
        assert!(matches!(parse_err("DEF_SYSCALL(1, x, , 0)"), ParseError::Grammar(_)));
        assert!(matches!(parse_err("DEF_SYSCALL(1, x, int, n)"), ParseError::Grammar(_)));
        // hex prefix is lowercase only, like the table format always was
        assert!(matches!(parse_err("DEF_SYSCALL(0X3, x, int, 0)"), ParseError::Grammar(_)));
        // missing close paren
        assert!(matches!(parse_err("DEF_SYSCALL(1, x, int, 0"), ParseError::Grammar(_)));
    }

    #[test]
    fn decimal_and_hex_literals_are_preserved() {
        assert_eq!(parse_ok("DEF_SYSCALL(16, close, long, 0)").number_lit, "16");
        assert_eq!(parse_ok("DEF_SYSCALL(0x10, close, long, 0)").number_lit, "0x10");
        assert_eq!(parse_ok("DEF_SYSCALL(0x10, close, long, 0)").number, 16);
    }

    #[test]
    fn table_preserves_order_and_skips_noise() {
        let src = "\
/* syscall table */

DEF_SYSCALL(0x1, write, long, 3, uint32_t fd, void *msg, uint32_t size)
#define NOT_A_SYSCALL 1
DEF_SYSCALL(0x2, brk, long, 1, uint32_t brk)

DEF_SYSCALL(0x3, exit_group, long, 0)
";
        let records = parse_table(src).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["write", "brk", "exit_group"]);
    }

    #[test]
    fn table_error_names_the_offending_line() {
        let src = "\
DEF_SYSCALL(0x1, write, long, 3, uint32_t fd, void *msg, uint32_t size)
DEF_SYSCALL(5, bad, int, 2, int a)
DEF_SYSCALL(0x3, exit_group, long, 0)
";
        let err = parse_table(src).unwrap_err();
        assert_eq!(err.line_no, 2);
        assert_eq!(err.line, "DEF_SYSCALL(5, bad, int, 2, int a)");
        assert_eq!(err.source, ParseError::TooFewArgs);
        assert!(err.to_string().contains("DEF_SYSCALL(5, bad, int, 2, int a)"));
    }
}
