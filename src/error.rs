use miette::Diagnostic;
use thiserror::Error;

/// Every failure the compiler can report.
///
/// Apart from `Parser`, each variant carries the literal `offender` that triggered it and
/// the normalized `code` line it was found on, so a caller can resolve the original source
/// line through [`crate::diagnostics::code_error`] without re-deriving anything.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum MonoError {
    #[error("{message}")]
    #[diagnostic(
        code(mono::css),
        help("The stylesheet is not valid CSS once notions are set aside.")
    )]
    Css {
        message: String,
        offender: String,
        code: String,
        line: usize,
        column: usize,
    },

    #[error("{message}")]
    #[diagnostic(
        code(mono::parser),
        help("The compile unit could not be loaded, check the path and its permissions.")
    )]
    Parser { message: String, path: String },

    #[error("{message}")]
    #[diagnostic(
        code(mono::type_error),
        help("Expected one of the following: immutable, protected, public.")
    )]
    Type {
        message: String,
        offender: String,
        code: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(mono::modifier),
        help("Expected one of the following: @override, @mutate.")
    )]
    Modifier {
        message: String,
        offender: String,
        code: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(mono::motive),
        help("Expected one of the following: ?overrule, ?overthrow, ?veto, ?fallback, ?because('reason'), ?patch('reason').")
    )]
    Motive {
        message: String,
        offender: String,
        code: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(mono::selector),
        help("Every selector fragment must start with an HTML element, e.g. `div.card` rather than `.card`.")
    )]
    Selector {
        message: String,
        offender: String,
        code: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(mono::abstract_notion),
        help("Notions are separated by single commas: <type,@modifier,?motive>.")
    )]
    AbstractNotion {
        message: String,
        offender: String,
        code: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(mono::declaration),
        help("Use a notion such as <immutable> instead of !important.")
    )]
    Declaration {
        message: String,
        offender: String,
        code: String,
    },
}

impl MonoError {
    pub fn type_error(message: impl Into<String>, offender: impl Into<String>) -> Self {
        let offender = offender.into();
        MonoError::Type {
            message: message.into(),
            code: offender.clone(),
            offender,
        }
    }

    pub fn modifier(message: impl Into<String>, offender: impl Into<String>) -> Self {
        let offender = offender.into();
        MonoError::Modifier {
            message: message.into(),
            code: offender.clone(),
            offender,
        }
    }

    pub fn motive(message: impl Into<String>, offender: impl Into<String>) -> Self {
        let offender = offender.into();
        MonoError::Motive {
            message: message.into(),
            code: offender.clone(),
            offender,
        }
    }

    pub fn selector(message: impl Into<String>, offender: impl Into<String>) -> Self {
        let offender = offender.into();
        MonoError::Selector {
            message: message.into(),
            code: offender.clone(),
            offender,
        }
    }

    pub fn abstract_notion(message: impl Into<String>, offender: impl Into<String>) -> Self {
        let offender = offender.into();
        MonoError::AbstractNotion {
            message: message.into(),
            code: offender.clone(),
            offender,
        }
    }

    pub fn declaration(message: impl Into<String>, offender: impl Into<String>) -> Self {
        let offender = offender.into();
        MonoError::Declaration {
            message: message.into(),
            code: offender.clone(),
            offender,
        }
    }

    /// Replaces the normalized line the error points at. The notion grammar only sees a
    /// property or selector, the lexer knows the whole line.
    #[must_use]
    pub fn with_code(mut self, line: impl Into<String>) -> Self {
        match &mut self {
            MonoError::Css { code, .. }
            | MonoError::Type { code, .. }
            | MonoError::Modifier { code, .. }
            | MonoError::Motive { code, .. }
            | MonoError::Selector { code, .. }
            | MonoError::AbstractNotion { code, .. }
            | MonoError::Declaration { code, .. } => *code = line.into(),
            MonoError::Parser { .. } => {}
        }
        self
    }

    pub fn message(&self) -> &str {
        match self {
            MonoError::Css { message, .. }
            | MonoError::Parser { message, .. }
            | MonoError::Type { message, .. }
            | MonoError::Modifier { message, .. }
            | MonoError::Motive { message, .. }
            | MonoError::Selector { message, .. }
            | MonoError::AbstractNotion { message, .. }
            | MonoError::Declaration { message, .. } => message,
        }
    }

    /// The literal fragment that caused the error. For load failures this is the path.
    pub fn offender(&self) -> &str {
        match self {
            MonoError::Parser { path, .. } => path,
            MonoError::Css { offender, .. }
            | MonoError::Type { offender, .. }
            | MonoError::Modifier { offender, .. }
            | MonoError::Motive { offender, .. }
            | MonoError::Selector { offender, .. }
            | MonoError::AbstractNotion { offender, .. }
            | MonoError::Declaration { offender, .. } => offender,
        }
    }

    /// The normalized line the offender sits on, `None` for load failures.
    pub fn code(&self) -> Option<&str> {
        match self {
            MonoError::Parser { .. } => None,
            MonoError::Css { code, .. }
            | MonoError::Type { code, .. }
            | MonoError::Modifier { code, .. }
            | MonoError::Motive { code, .. }
            | MonoError::Selector { code, .. }
            | MonoError::AbstractNotion { code, .. }
            | MonoError::Declaration { code, .. } => Some(code),
        }
    }

    /// Short heading used when the error is written to the log.
    pub fn title(&self) -> &'static str {
        match self {
            MonoError::Css { .. } => "[Format error] Invalid CSS",
            MonoError::Parser { .. } => "[Parser error] Unable to load source",
            MonoError::Type { .. } => "[Type error]",
            MonoError::Modifier { .. } => "[Modifier error]",
            MonoError::Motive { .. } => "[Motive error]",
            MonoError::Selector { .. } => "[Selector error]",
            MonoError::AbstractNotion { .. } => "[Notion error]",
            MonoError::Declaration { .. } => "[Declaration error]",
        }
    }
}
