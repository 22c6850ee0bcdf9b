use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use crate::{
    error::TlError,
    gen_cpp::generate_source,
    grouping::group_objects,
    parser::{parse_files, ParseOptions},
    types::{Layer, Object},
};

pub const FUNCTIONS_FILE: &str = "functions.cpp";
pub const TYPES_FILE:     &str = "types.cpp";

/// Both generated files, rendered but not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSources {
    pub functions: String,
    pub types:     String,
}

/// Renders the functions and types files for already parsed objects.
pub fn compile_objects(objects: &[Object]) -> GeneratedSources {
    let grouped = group_objects(objects);
    tracing::debug!(
        functions = grouped.functions.object_count(),
        types = grouped.types.object_count(),
        "grouped objects"
    );
    GeneratedSources {
        functions: generate_source(&grouped.functions),
        types:     generate_source(&grouped.types),
    }
}

/// Parses every source (core types dropped) and renders both files.
/// Nothing is rendered unless every source parses.
pub fn compile_sources<P: AsRef<Path>>(sources: &[(Layer, P)]) -> Result<GeneratedSources, TlError> {
    let objects = parse_files(sources, ParseOptions { ignore_core: true })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(compile_objects(&objects))
}

/// Pretty JSON of the parsed object model.
pub fn dump_json(objects: &[Object]) -> Result<String, TlError> {
    serde_json::to_string_pretty(objects).map_err(|e| TlError::EncodeError(e.to_string()))
}

/// Writes the generated files into one output directory.
#[derive(Debug, Clone)]
pub struct Generator {
    output_dir: PathBuf,
}

impl Generator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Generator { output_dir: output_dir.into() }
    }

    /// Removes previously generated files (or directories in their place).
    pub fn clean(&self) -> Result<(), TlError> {
        for name in [FUNCTIONS_FILE, TYPES_FILE] {
            let path = self.output_dir.join(name);
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if metadata.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            tracing::info!(path = %path.display(), "removed previous output");
        }
        Ok(())
    }

    /// Parses `sources`, renders both files and only then writes them.
    pub fn generate<P: AsRef<Path>>(&self, sources: &[(Layer, P)]) -> Result<GeneratedSources, TlError> {
        fs::create_dir_all(&self.output_dir)?;
        let generated = compile_sources(sources)?;
        self.write_artifact(FUNCTIONS_FILE, &generated.functions)?;
        self.write_artifact(TYPES_FILE, &generated.types)?;
        Ok(generated)
    }

    // Written beside the target and renamed, so a failed write never
    // leaves a truncated file under the final name.
    fn write_artifact(&self, name: &str, contents: &str) -> Result<(), TlError> {
        let path = self.output_dir.join(name);
        let tmp = self.output_dir.join(format!(".{}.tmp", name));
        if let Err(e) = fs::write(&tmp, contents) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::info!(path = %path.display(), bytes = contents.len(), "wrote artifact");
        Ok(())
    }
}
