use std::fmt::Write;

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::{Files, SimpleFile};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tallyeval::EvalError;

use crate::cli::Cli;
use crate::editor::{Editor, EditorRead};
use crate::report::Report;

pub struct Driver {
    expr:       Option<String>,
    stdin:      bool,
    quiet:      bool,
    max_errors: usize,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(<Cli as clap::Parser>::parse())
    }

    fn from_config(cfg: Cli) -> Self {
        Self {
            expr:       cfg.expr,
            stdin:      cfg.stdin,
            quiet:      cfg.quiet,
            max_errors: cfg.max_errors,
        }
    }

    pub fn run(self) {
        if let Some(expr) = &self.expr {
            self.eval_line(expr);
        } else if self.stdin {
            self.eval_stdin();
        } else {
            let _ = self.repl();
        }
    }

    fn eval_stdin(&self) {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            self.eval_line(&line);
        }
    }

    fn eval_line(&self, input: &str) {
        // spans index into the trimmed expression
        let expr = input.trim();
        match tallyeval::try_evaluate(expr) {
            Ok(value) => println!("{value}"),
            Err(err) => self.report_eval_error(expr, err),
        }
    }

    fn report_eval_error(&self, expr: &str, error: EvalError) {
        let file = SimpleFile::new("<expr>".to_string(), expr.to_string());
        match error {
            EvalError::Guard(err) => self.report(&[err], &file),
            EvalError::Lex(spands) => self.report(&spands, &file),
            EvalError::Parse(err) => self.report(&[err], &file),
        }
    }

    fn report<'a, F, E>(&self, errors: &[E], files: &'a F)
    where
        F: Files<'a, FileId = ()>,
        E: Report,
    {
        if self.quiet {
            return;
        }
        let writer = StandardStream::stderr(ColorChoice::Always);
        let config = codespan_reporting::term::Config::default();
        let mut displayed = 0;
        {
            let mut writer = writer.lock();
            for e in errors.iter().take(self.max_errors) {
                let report = e.diagnose();
                let _ = term::emit(&mut writer, &config, files, &report);
                displayed += 1;
            }
        }

        let mut message = "could not evaluate expression".to_string();
        let _ = message.write_fmt(format_args!(
            " due to {} previous {} ({} emitted)",
            errors.len(),
            if errors.len() > 1 { "errors" } else { "error" },
            displayed
        ));

        let error = Diagnostic::error().with_message(message);

        let _ = term::emit(&mut writer.lock(), &config, files, &error);
    }

    fn repl(&self) -> std::io::Result<()> {
        let mut editor = Editor::default();
        loop {
            match editor.read()? {
                EditorRead::Read(input) => self.eval_line(&input),
                EditorRead::Break => break,
                EditorRead::Continue => continue,
            }
        }

        Ok(())
    }
}
