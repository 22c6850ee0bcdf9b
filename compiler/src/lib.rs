//! thallium-tl-compiler
//!
//! This crate implements:
//!  1) A parser for layered TL schemas, in both the JSON and the line-based dialect,
//!  2) The object model with canonical (CRC-32) constructor ID inference and checking,
//!  3) A tokenizer + resolver for the argument type grammar (flags, vectors, generics),
//!  4) Grouping by layer and namespace, and C++ code generation (`compile_sources` → `String`s),
//!  5) Error types (`TlError`) and the `Generator` that writes the output files.

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod verifier;
pub mod grouping;
pub mod source_builder;
pub mod gen_cpp;
pub mod compiler;

pub use compiler::{compile_objects, compile_sources, dump_json, GeneratedSources, Generator};
pub use error::TlError;
pub use parser::{parse_files, parse_str, ParseOptions};
pub use types::{Argument, Layer, Object};
