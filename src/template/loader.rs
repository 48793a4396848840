//! Template pack loading from ZIP files and directories.

use super::{Template, TemplateLibrary};
use crate::error::{MatcherError, Result};
use std::io::Read;
use std::path::Path;

/// Load a single template file.
pub fn load_template_file<P: AsRef<Path>>(path: P) -> Result<Template> {
    let contents = std::fs::read_to_string(path)?;
    Template::from_json(&contents)
}

/// Load a template pack from a file path.
///
/// Supports both ZIP files and directories.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<TemplateLibrary> {
    let path = path.as_ref();

    if path.is_dir() {
        load_from_directory(path)
    } else {
        let data = std::fs::read(path)?;
        load_from_bytes(&data)
    }
}

/// Load a template pack from bytes (ZIP data).
pub fn load_from_bytes(data: &[u8]) -> Result<TemplateLibrary> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut library = TemplateLibrary::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }

        let file_path = file.name().to_string();
        let Some(name) = template_name(&file_path) else {
            continue;
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        add_parsed(&mut library, &name, &contents);
    }

    finish(library)
}

/// Load a template pack from a directory tree.
fn load_from_directory(root: &Path) -> Result<TemplateLibrary> {
    let mut library = TemplateLibrary::new();
    load_json_files_recursive(root, root, &mut |name, contents| {
        add_parsed(&mut library, name, contents);
    })?;
    finish(library)
}

fn load_json_files_recursive<F>(root: &Path, dir: &Path, callback: &mut F) -> Result<()>
where
    F: FnMut(&str, &str),
{
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            load_json_files_recursive(root, &path, callback)?;
            continue;
        }

        let relative = match path.strip_prefix(root) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => continue,
        };

        if let Some(name) = template_name(&relative) {
            let contents = std::fs::read_to_string(&path)?;
            callback(&name, &contents);
        }
    }

    Ok(())
}

/// Template name for an archive path: relative path without `.json`.
fn template_name(path: &str) -> Option<String> {
    let trimmed = path.trim_start_matches("./").trim_start_matches('/');
    trimmed
        .strip_suffix(".json")
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn add_parsed(library: &mut TemplateLibrary, name: &str, contents: &str) {
    match Template::from_json(contents) {
        Ok(template) => library.add_template(name, template),
        Err(e) => {
            // Log warning but continue
            tracing::warn!("Failed to parse template {}: {}", name, e);
        }
    }
}

fn finish(library: TemplateLibrary) -> Result<TemplateLibrary> {
    if library.template_count() == 0 {
        return Err(MatcherError::InvalidTemplatePack(
            "No template JSON files found".to_string(),
        ));
    }
    tracing::debug!("Loaded {} templates", library.template_count());
    Ok(library)
}
