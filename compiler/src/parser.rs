use std::fs;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::error::Category;
use crate::{
    error::TlError,
    types::{Argument, Layer, Object},
    utils::quote,
};

lazy_static! {
    static ref DECLARATION: Regex = Regex::new(
        r"(?ix)
        ^
        ([\w.]+)                          # name or namespace.name
        (?:\#([0-9a-f]+))?                # optional hexadecimal constructor ID
        (?:\s\{?\w+:[\w<>\#.?!%]+\}?)*    # arguments, {X:Type} included
        \s=\s
        ([\w<>\#.?]+)                     # result type
        ;$
        "
    ).unwrap();
    static ref ARGUMENT:       Regex = Regex::new(r"(\{)?(\w+):([\w<>#.?!%]+)(\})?").unwrap();
    static ref SECTION_MARKER: Regex = Regex::new(r"^---(\w+)---").unwrap();
    static ref LAYER_MARKER:   Regex = Regex::new(r"^===(\d+)===$").unwrap();
}

/// Declared by every textual schema but not expressible in its grammar.
const VECTOR_DECLARATION: &str = "vector#1cb5c415 ";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParseOptions {
    /// Drop `boolFalse`, `boolTrue`, `true` and `vector` from the output.
    pub ignore_core: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dialect {
    /// JSON document with `constructors` and `methods` lists.
    Structured,
    /// One declaration per line.
    Textual,
}

/// Parses a single textual declaration such as `getUser#fa7de60f id:int = User;`.
pub fn parse_declaration(line: &str, layer: Layer, is_function: bool) -> Result<Object, TlError> {
    let caps = DECLARATION
        .captures(line)
        .ok_or_else(|| TlError::grammar(format!("Cannot parse declaration {}", quote(line))))?;

    let id = match caps.get(2) {
        Some(hex) => Some(u32::from_str_radix(hex.as_str(), 16).map_err(|_| {
            TlError::grammar(format!("Invalid constructor ID {}", quote(hex.as_str())))
        })?),
        None => None,
    };

    let mut arguments = Vec::new();
    for arg in ARGUMENT.captures_iter(line) {
        arguments.push(Argument::new(&arg[2], &arg[3], arg.get(1).is_some())?);
    }

    Object::new(&caps[1], id, arguments, &caps[3], layer, is_function)
}

#[derive(Deserialize)]
struct JsonScheme {
    #[serde(default)]
    constructors: Vec<JsonEntry>,
    #[serde(default)]
    methods:      Vec<JsonEntry>,
}

#[derive(Deserialize)]
struct JsonEntry {
    #[serde(alias = "method")]
    predicate: String,
    id:        JsonNumber,
    #[serde(rename = "type")]
    type_:     String,
    #[serde(default)]
    params:    Vec<JsonParam>,
    #[serde(default)]
    layer:     Option<JsonNumber>,
}

#[derive(Deserialize)]
struct JsonParam {
    name:  String,
    #[serde(rename = "type")]
    type_: String,
}

/// Numbers appear both bare and quoted in published schemas.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonNumber {
    Int(i64),
    Text(String),
}

impl JsonNumber {
    fn as_i64(&self, what: &str) -> Result<i64, TlError> {
        match self {
            JsonNumber::Int(v) => Ok(*v),
            JsonNumber::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| TlError::grammar(format!("Invalid {} {}", what, quote(s)))),
        }
    }
}

impl JsonEntry {
    fn into_object(self, default_layer: Layer, is_function: bool) -> Result<Object, TlError> {
        let raw = self.id.as_i64("id")?;
        // Stored signed; the canonical ID is the same 32 bits read unsigned.
        let id = i32::try_from(raw).map_err(|_| {
            TlError::grammar(format!(
                "ID {} of {} is outside the signed 32-bit range",
                raw,
                quote(&self.predicate)
            ))
        })? as u32;

        let layer = match &self.layer {
            Some(l) => Layer::try_from(l.as_i64("layer")?)
                .map_err(|_| TlError::grammar(format!("Invalid layer for {}", quote(&self.predicate))))?,
            None => default_layer,
        };

        let arguments = self
            .params
            .iter()
            .map(|p| Argument::new(&p.name, &p.type_, false))
            .collect::<Result<Vec<_>, _>>()?;

        Object::new(&self.predicate, Some(id), arguments, self.type_, layer, is_function)
    }
}

struct StructuredSource {
    entries: std::vec::IntoIter<(JsonEntry, bool)>,
    layer:   Layer,
}

impl Iterator for StructuredSource {
    type Item = Result<Object, TlError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, is_function) = self.entries.next()?;
        Some(entry.into_object(self.layer, is_function))
    }
}

struct TextualSource {
    lines:       std::iter::Enumerate<std::vec::IntoIter<String>>,
    layer:       Layer,
    is_function: bool,
}

impl Iterator for TextualSource {
    type Item = Result<Object, TlError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, raw) in self.lines.by_ref() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(caps) = SECTION_MARKER.captures(line) {
                self.is_function = &caps[1] == "functions";
                tracing::debug!(line = line_no, is_function = self.is_function, "section marker");
                continue;
            }

            if let Some(caps) = LAYER_MARKER.captures(line) {
                match caps[1].parse::<Layer>() {
                    Ok(layer) => {
                        self.layer = layer;
                        tracing::debug!(line = line_no, layer, "layer marker");
                        continue;
                    }
                    Err(_) => {
                        return Some(Err(TlError::grammar(format!(
                            "Invalid layer marker {}",
                            quote(line)
                        ))
                        .at_line(line_no)));
                    }
                }
            }

            match parse_declaration(line, self.layer, self.is_function) {
                Err(TlError::ParseError { .. }) if line.starts_with(VECTOR_DECLARATION) => {
                    tracing::debug!(line = line_no, "skipping vector pseudo-type");
                    continue;
                }
                result => return Some(result.map_err(|e| e.at_line(line_no))),
            }
        }
        None
    }
}

enum Source {
    Structured(StructuredSource),
    Textual(TextualSource),
    Failed(Option<TlError>),
}

/// Lazily parsed objects of one schema source.
pub struct SourceObjects {
    source:  Source,
    options: ParseOptions,
}

impl SourceObjects {
    /// Detects the dialect of `text` and prepares to parse it. Declarations
    /// without an explicit layer are assigned `layer`.
    pub fn new(text: &str, layer: Layer, options: ParseOptions) -> SourceObjects {
        let source = match serde_json::from_str::<JsonScheme>(text) {
            Ok(scheme) => {
                let entries: Vec<(JsonEntry, bool)> = scheme
                    .constructors
                    .into_iter()
                    .map(|c| (c, false))
                    .chain(scheme.methods.into_iter().map(|m| (m, true)))
                    .collect();
                Source::Structured(StructuredSource {
                    entries: entries.into_iter(),
                    layer,
                })
            }
            Err(e) if matches!(e.classify(), Category::Syntax | Category::Eof) => {
                let lines: Vec<String> = text.lines().map(str::to_string).collect();
                Source::Textual(TextualSource {
                    lines: lines.into_iter().enumerate(),
                    layer,
                    is_function: false,
                })
            }
            Err(e) => Source::Failed(Some(e.into())),
        };
        SourceObjects { source, options }
    }

    pub fn dialect(&self) -> Option<Dialect> {
        match self.source {
            Source::Structured(_) => Some(Dialect::Structured),
            Source::Textual(_) => Some(Dialect::Textual),
            Source::Failed(_) => None,
        }
    }
}

impl Iterator for SourceObjects {
    type Item = Result<Object, TlError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = match &mut self.source {
                Source::Structured(s) => s.next(),
                Source::Textual(s) => s.next(),
                Source::Failed(e) => e.take().map(Err),
            }?;

            match item {
                Ok(object) if self.options.ignore_core && object.is_core_type() => continue,
                other => return Some(other),
            }
        }
    }
}

/// Parses an in-memory schema source.
pub fn parse_str(text: &str, layer: Layer, options: ParseOptions) -> SourceObjects {
    SourceObjects::new(text, layer, options)
}

/// Objects of several schema files, read one at a time in the given order.
/// The stream ends after the first error.
pub struct ObjectStream {
    sources: std::vec::IntoIter<(Layer, PathBuf)>,
    current: Option<SourceObjects>,
    options: ParseOptions,
    failed:  bool,
}

impl ObjectStream {
    fn open(&mut self, layer: Layer, path: &Path) -> Result<(), TlError> {
        let text = fs::read_to_string(path)?;
        let objects = SourceObjects::new(&text, layer, self.options);
        tracing::debug!(layer, path = %path.display(), dialect = ?objects.dialect(), "parsing scheme");
        self.current = Some(objects);
        Ok(())
    }
}

impl Iterator for ObjectStream {
    type Item = Result<Object, TlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(item) => {
                        self.failed = item.is_err();
                        return Some(item);
                    }
                    None => self.current = None,
                }
            }

            let (layer, path) = self.sources.next()?;
            if let Err(e) = self.open(layer, &path) {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

/// Parses every `(layer, path)` source in order. Each call starts over.
pub fn parse_files<P: AsRef<Path>>(sources: &[(Layer, P)], options: ParseOptions) -> ObjectStream {
    let sources: Vec<(Layer, PathBuf)> = sources
        .iter()
        .map(|(layer, path)| (*layer, path.as_ref().to_path_buf()))
        .collect();
    ObjectStream {
        sources: sources.into_iter(),
        current: None,
        options,
        failed:  false,
    }
}
