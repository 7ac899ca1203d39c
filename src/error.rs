//! Error taxonomy for the compiler pipeline (spec §7).
//!
//! Every variant is fatal to the conversion it occurred in; nothing here is
//! recovered internally. The `warn`/`silent` duplicate-declaration policies
//! never construct `DuplicateDeclaration` — they log via `tracing` instead.

use std::path::PathBuf;

use crate::token::TokenKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected token {found:?} ({value:?}) at {line}:{column}, expected {expected}")]
    Parse {
        found: TokenKind,
        value: String,
        line: usize,
        column: usize,
        expected: String,
    },

    #[error("could not resolve import {specifier:?} from {importer}")]
    Resolution {
        specifier: String,
        importer: PathBuf,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate declaration {name:?} in {first} and {second}")]
    DuplicateDeclaration {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("defineNameTransform maps both {first:?} and {second:?} to {transformed:?}")]
    NameCollision {
        first: String,
        second: String,
        transformed: String,
    },

    #[error("{callback} callback failed for {type_name:?}: {message}")]
    Callback {
        callback: &'static str,
        type_name: String,
        message: String,
    },

    #[error("defineId produced the same id {id:?} for both {first:?} and {second:?}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
