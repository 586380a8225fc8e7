//! Command shell over a [`Spreadsheet`].
//!
//! One command per line. Results are printed as pretty JSON; failures are
//! reported as `CODE: message`.

use regex::Regex;
use sheetcalc_core::Spreadsheet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{AppError, Result};
use crate::storage::{read_dump, write_dump};

pub const HELP: &str = "\
Commands:
    clear                 clear spreadsheet
    copy DEST SRC         copy formula from cell SRC to cell DEST
    delete CELL           delete formula in cell CELL
    dump                  dump formulas in topological order
    eval CELL FORMULA     eval FORMULA into cell CELL
    CELL = FORMULA        same as eval
    load FILE             replace spreadsheet with dump in FILE
    save FILE             write dump to FILE
    query CELL            show formula and current value of CELL
    help                  show this message";

/// A parsed shell command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Clear,
    Copy { dest: String, src: String },
    Delete(String),
    Dump,
    Eval { cell: String, formula: String },
    Load(PathBuf),
    Save(PathBuf),
    Query(String),
    Help,
}

fn assignment_re() -> &'static Regex {
    static ASSIGN_RE: OnceLock<Regex> = OnceLock::new();
    ASSIGN_RE.get_or_init(|| {
        Regex::new(r"^(?<cell>\$?[A-Za-z]\$?[0-9]+)\s*=(?<formula>.*)$")
            .expect("assignment regex must compile")
    })
}

fn usage(message: &str) -> AppError {
    AppError::Usage(format!("{} (try 'help')", message))
}

fn expect_args<'a>(name: &str, rest: &'a str, count: usize) -> Result<Vec<&'a str>> {
    let args: Vec<&str> = rest.split_whitespace().collect();
    if args.len() != count {
        return Err(usage(&format!("command {} needs {} argument(s)", name, count)));
    }
    Ok(args)
}

impl Command {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        if let Some(caps) = assignment_re().captures(line) {
            return Ok(Some(Command::Eval {
                cell: caps["cell"].to_string(),
                formula: caps["formula"].trim().to_string(),
            }));
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match name {
            "clear" => {
                expect_args(name, rest, 0)?;
                Command::Clear
            }
            "dump" => {
                expect_args(name, rest, 0)?;
                Command::Dump
            }
            "help" => Command::Help,
            "copy" => {
                let args = expect_args(name, rest, 2)?;
                Command::Copy {
                    dest: args[0].to_string(),
                    src: args[1].to_string(),
                }
            }
            "delete" => Command::Delete(expect_args(name, rest, 1)?[0].to_string()),
            "query" => Command::Query(expect_args(name, rest, 1)?[0].to_string()),
            "load" | "save" if rest.is_empty() => {
                return Err(usage(&format!("command {} needs a file", name)));
            }
            "load" => Command::Load(PathBuf::from(rest)),
            "save" => Command::Save(PathBuf::from(rest)),
            "eval" => {
                let Some((cell, formula)) = rest.split_once(char::is_whitespace) else {
                    return Err(usage("command eval needs a cell and a formula"));
                };
                Command::Eval {
                    cell: cell.to_string(),
                    formula: formula.trim().to_string(),
                }
            }
            other => return Err(usage(&format!("invalid command {}", other))),
        };
        Ok(Some(command))
    }
}

/// Runs commands against one spreadsheet.
pub struct Shell {
    sheet: Spreadsheet,
}

impl Shell {
    pub fn new(sheet: Spreadsheet) -> Self {
        Shell { sheet }
    }

    pub fn sheet(&self) -> &Spreadsheet {
        &self.sheet
    }

    /// Replace the spreadsheet with the formulas in a dump file.
    /// The current spreadsheet is kept if any formula fails.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let pairs = read_dump(path)?;
        let mut sheet = Spreadsheet::new(self.sheet.name());
        sheet.load(pairs)?;
        self.sheet = sheet;
        Ok(())
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        write_dump(path, &self.sheet.dump())
    }

    /// Run a command, returning the text to print, if any.
    pub fn execute(&mut self, command: Command) -> Result<Option<String>> {
        let output = match command {
            Command::Clear => {
                self.sheet.clear();
                None
            }
            Command::Copy { dest, src } => {
                Some(serde_json::to_string_pretty(&self.sheet.copy(&dest, &src)?)?)
            }
            Command::Delete(cell) => Some(serde_json::to_string_pretty(&self.sheet.remove(&cell)?)?),
            Command::Dump => Some(serde_json::to_string_pretty(&self.sheet.dump())?),
            Command::Eval { cell, formula } => {
                Some(serde_json::to_string_pretty(&self.sheet.eval(&cell, &formula)?)?)
            }
            Command::Load(path) => {
                self.load_file(&path)?;
                None
            }
            Command::Save(path) => {
                self.save_file(&path)?;
                None
            }
            Command::Query(cell) => Some(serde_json::to_string_pretty(&self.sheet.query(&cell))?),
            Command::Help => Some(HELP.to_string()),
        };
        Ok(output)
    }

    /// Parse and run one line, writing any output to `out`.
    pub fn run_line(&mut self, line: &str, out: &mut impl Write) -> Result<()> {
        let Some(command) = Command::parse(line)? else {
            return Ok(());
        };
        if let Some(text) = self.execute(command)? {
            writeln!(out, "{}", text)?;
        }
        Ok(())
    }

    /// Read-eval-print loop. Command failures are reported and the loop goes on.
    pub fn repl(&mut self, input: impl BufRead, out: &mut impl Write, prompt: Option<&str>) -> io::Result<()> {
        let show_prompt = |out: &mut dyn Write| -> io::Result<()> {
            if let Some(prompt) = prompt {
                write!(out, "{}", prompt)?;
                out.flush()?;
            }
            Ok(())
        };

        show_prompt(out)?;
        for line in input.lines() {
            if let Err(err) = self.run_line(&line?, out) {
                eprintln!("{}", err);
            }
            show_prompt(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(shell: &mut Shell, line: &str) -> String {
        let mut out = Vec::new();
        shell.run_line(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  ").unwrap(), None);
        assert_eq!(Command::parse("# note").unwrap(), None);
        assert_eq!(Command::parse("dump").unwrap(), Some(Command::Dump));
        assert_eq!(
            Command::parse("copy b2 a1").unwrap(),
            Some(Command::Copy {
                dest: "b2".to_string(),
                src: "a1".to_string()
            })
        );
        assert_eq!(
            Command::parse("eval a1 1 + max(2, 3)").unwrap(),
            Some(Command::Eval {
                cell: "a1".to_string(),
                formula: "1 + max(2, 3)".to_string()
            })
        );
        assert_eq!(
            Command::parse("B3 = a1 * 2").unwrap(),
            Some(Command::Eval {
                cell: "B3".to_string(),
                formula: "a1 * 2".to_string()
            })
        );
        assert_eq!(
            Command::parse("$a$1 = 1").unwrap(),
            Some(Command::Eval {
                cell: "$a$1".to_string(),
                formula: "1".to_string()
            })
        );
        assert_eq!(
            Command::parse("load my sheet.json").unwrap(),
            Some(Command::Load(PathBuf::from("my sheet.json")))
        );
    }

    #[test]
    fn test_parse_usage_errors() {
        assert!(matches!(Command::parse("copy a1"), Err(AppError::Usage(_))));
        assert!(matches!(Command::parse("frobnicate"), Err(AppError::Usage(_))));
        assert!(matches!(Command::parse("eval a1"), Err(AppError::Usage(_))));
        assert!(matches!(Command::parse("save"), Err(AppError::Usage(_))));
        assert!(matches!(Command::parse("clear now"), Err(AppError::Usage(_))));
    }

    #[test]
    fn test_eval_prints_updates_as_json() {
        let mut shell = Shell::new(Spreadsheet::new("test"));
        run(&mut shell, "a1 = 22");
        run(&mut shell, "a2 = a1 * b1");
        let out = run(&mut shell, "eval b1 3");
        let updates: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(updates, serde_json::json!({ "a2": 66.0, "b1": 3.0 }));
    }

    #[test]
    fn test_assignment_accepts_absolute_id() {
        let mut shell = Shell::new(Spreadsheet::new("test"));
        let out = run(&mut shell, "$b$2 = 4 * 2");
        let updates: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(updates, serde_json::json!({ "b2": 8.0 }));
    }

    #[test]
    fn test_errors_carry_code() {
        let mut shell = Shell::new(Spreadsheet::new("test"));
        let err = shell.run_line("a1 = a1 + 1", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().starts_with("CIRCULAR_REF: "), "{}", err);
        let err = shell.run_line("a1 = 1 +", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().starts_with("SYNTAX: "), "{}", err);
    }

    #[test]
    fn test_repl_continues_after_error() {
        let mut shell = Shell::new(Spreadsheet::new("test"));
        let input = "a1 = 2\na2 = a2\na2 = a1 * 5\n".as_bytes();
        let mut out = Vec::new();
        shell.repl(input, &mut out, None).unwrap();
        assert_eq!(shell.sheet().query("a2").value, 10.0);
    }

    #[test]
    fn test_failed_load_keeps_sheet() {
        let path = std::env::temp_dir().join(format!("sheetcalc-shell-{}.json", std::process::id()));
        std::fs::write(&path, r#"[["a1", "1"], ["a2", "a2"]]"#).unwrap();
        let mut shell = Shell::new(Spreadsheet::new("test"));
        run(&mut shell, "b1 = 7");
        assert!(shell.load_file(&path).is_err());
        assert_eq!(shell.sheet().query("b1").value, 7.0);
        assert_eq!(shell.sheet().query("a1").expr, "");
        let _ = std::fs::remove_file(&path);
    }
}
