use std::error::Error;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use tallyeval::span::Spand;

pub trait Report {
    fn diagnose(&self) -> Diagnostic<()>;
}

impl<T: Error> Report for Spand<T> {
    fn diagnose(&self) -> Diagnostic<()> {
        Diagnostic::error()
            .with_message(self.kind().to_string())
            .with_label(Label::primary((), self.span))
    }
}
