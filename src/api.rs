use crate::diagnostics;
use crate::error::MonoError;
use crate::formatter;
use crate::lexer::{Lexer, Token};
use crate::parser;
use crate::source::{SourceFile, DEFAULT_EXTENSION};
use serde::Deserialize;
use std::path::Path;

/// How a failed compile unit is written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStyle {
    /// Only the error message.
    Off,
    /// Heading, `"<n> | <line>"` snippet with carets, and a tip.
    #[default]
    Snippet,
    /// A miette graphical report over the original source.
    Fancy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    pub diagnostics: DiagnosticStyle,
    /// Appended to paths that lack it when loading compile units.
    pub extension: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            diagnostics: DiagnosticStyle::default(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// The output of one successfully compiled unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub name: String,
    pub order: usize,
    /// The formatter's canonical text the tokens were read from.
    pub canonical: String,
    pub tokens: Vec<Token>,
    pub css: String,
}

impl CompileResult {
    /// Serializes the token stream in its `[kind, text, location, notion?]` shape.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn tokens_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.tokens)
    }
}

/// Runs formatter, lexer and parser over compile units, one unit at a time.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiles a single unit. A failure is logged with the configured diagnostics
    /// before it is returned.
    ///
    /// # Errors
    /// Returns the first `MonoError` raised by the formatter, lexer or parser.
    pub fn compile(&self, file: &SourceFile) -> Result<CompileResult, MonoError> {
        match self.run(file) {
            Ok(result) => {
                log::info!(
                    "compiled {} ({} tokens, {} bytes of css)",
                    file.name,
                    result.tokens.len(),
                    result.css.len()
                );
                Ok(result)
            }
            Err(err) => {
                self.report_failure(file, &err);
                Err(err)
            }
        }
    }

    /// Compiles every unit in ascending `order`, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the error of the first unit that fails; later units are not compiled.
    pub fn compile_all(&self, files: &[SourceFile]) -> Result<Vec<CompileResult>, MonoError> {
        let mut ordered: Vec<&SourceFile> = files.iter().collect();
        ordered.sort_by_key(|file| file.order);
        ordered.into_iter().map(|file| self.compile(file)).collect()
    }

    /// Loads and compiles `paths`, each path's position giving its compile order.
    ///
    /// # Errors
    /// Returns `MonoError::Parser` if a unit cannot be read, otherwise the first compile
    /// error.
    pub fn compile_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<Vec<CompileResult>, MonoError> {
        let files = paths
            .iter()
            .enumerate()
            .map(|(order, path)| {
                SourceFile::read_with_extension(path, order, &self.options.extension).map_err(
                    |err| {
                        log::error!("{} {err}", err.title());
                        err
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.compile_all(&files)
    }

    fn run(&self, file: &SourceFile) -> Result<CompileResult, MonoError> {
        let canonical = formatter::format(file)?;
        let tokens = Lexer::new(&canonical).tokenize()?;
        let css = parser::parse(&tokens)?;
        Ok(CompileResult {
            name: file.name.clone(),
            order: file.order,
            canonical,
            tokens,
            css,
        })
    }

    fn report_failure(&self, file: &SourceFile, err: &MonoError) {
        match self.options.diagnostics {
            DiagnosticStyle::Off => log::error!("{} {} ({})", err.title(), err, file.name),
            DiagnosticStyle::Snippet => log::error!("{}", diagnostics::render(file, err)),
            DiagnosticStyle::Fancy => log::error!("{}", diagnostics::render_fancy(file, err)),
        }
    }
}

/// Compiles `file` with default options.
///
/// # Errors
/// See [`Compiler::compile`].
pub fn compile(file: &SourceFile) -> Result<CompileResult, MonoError> {
    Compiler::default().compile(file)
}
