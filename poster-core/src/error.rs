use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from building or exporting a poster.
#[derive(Debug, Error)]
pub enum PosterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot read {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("invalid column {0:?} (expected \"left\" or \"right\")")]
    InvalidColumn(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Errors from decoding an embedded image.
#[derive(Debug, Error, PartialEq)]
pub enum ImageError {
    #[error("image data too short to detect format")]
    TooShort,
    #[error("unsupported image format (expected JPEG or PNG)")]
    UnsupportedFormat,
    #[error("unsupported JPEG component count: {0} (expected 1 or 3)")]
    JpegComponents(u8),
    #[error("JPEG SOF marker truncated")]
    JpegTruncated,
    #[error("no SOF marker found in JPEG data")]
    JpegNoFrame,
    #[error("PNG decode error: {0}")]
    Png(String),
    #[error("unsupported PNG color type: {0}")]
    PngColorType(String),
}

/// Errors from parsing or expanding markup.
#[derive(Debug, Error, PartialEq)]
pub enum MarkupError {
    #[error("unknown command \\{0}")]
    UnknownCommand(String),
    #[error("unbalanced braces: unexpected '}}' at byte {0}")]
    UnexpectedCloseBrace(usize),
    #[error("unbalanced braces: group opened at byte {0} is never closed")]
    UnclosedGroup(usize),
    #[error("\\{0} expects an argument in braces")]
    MissingArgument(String),
    #[error("unknown environment {0:?}")]
    UnknownEnvironment(String),
    #[error("\\end{{{found}}} does not match \\begin{{{expected}}}")]
    MismatchedEnd { expected: String, found: String },
    #[error("environment {0:?} is never closed")]
    UnclosedEnvironment(String),
    #[error("\\item outside of a list")]
    ItemOutsideList,
    #[error("runaway macro expansion (limit {0})")]
    RunawayMacro(usize),
    #[error("invalid macro definition: {0}")]
    BadDefinition(String),
    #[error("character {0:?} cannot be encoded")]
    Unencodable(char),
    #[error("unexpected {0:?} in preamble")]
    PreambleContent(String),
}
