//! Template unpacking and per-name slide materialization.
//!
//! All functions here are blocking; the orchestrator runs them under
//! `tokio::task::spawn_blocking`. They mutate files only inside the
//! working directory and never touch the template source.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use kuvertki_core::slides;

use crate::error::PipelineError;

/// Presentation root document inside the unpacked deck.
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Root relationship manifest.
pub const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Package content-types manifest.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Per-slide document directory.
pub const SLIDES_DIR: &str = "ppt/slides";

/// Per-slide relationship sidecar directory.
pub const SLIDE_RELS_DIR: &str = "ppt/slides/_rels";

/// The slide used as the substitution template.
pub const TEMPLATE_SLIDE_PART: &str = "ppt/slides/slide1.xml";

/// Styling sidecar shared by all generated slides.
pub const TEMPLATE_SLIDE_RELS_PART: &str = "ppt/slides/_rels/slide1.xml.rels";

/// Unpack the template archive into a fresh, uniquely-named working
/// directory under `work_root`.
///
/// The returned [`TempDir`] owns the directory; dropping it removes the
/// directory and everything in it.
pub fn unpack_template(template: &Path, work_root: &Path) -> Result<TempDir, PipelineError> {
    if !template.is_file() {
        return Err(PipelineError::TemplateMissing(template.to_path_buf()));
    }
    let workdir = tempfile::Builder::new()
        .prefix("kuvertki-")
        .tempdir_in(work_root)?;
    let file = fs::File::open(template)?;
    let mut archive = zip::ZipArchive::new(file)?;
    archive.extract(workdir.path())?;
    tracing::debug!(workdir = %workdir.path().display(), "template unpacked");
    Ok(workdir)
}

/// Write one slide document per name and realign the deck manifests.
///
/// After this returns, the working directory holds exactly `names.len()`
/// slide files, each with a matching slide-list entry, relationship entry,
/// content-type override, and styling sidecar.
pub fn materialize_slides(workdir: &Path, names: &[String]) -> Result<(), PipelineError> {
    let template_slide = read_part(workdir, TEMPLATE_SLIDE_PART)?;
    let slides_dir = workdir.join(SLIDES_DIR);

    // Surplus template slides would end up in the archive without manifest
    // entries, so they are dropped before generation.
    remove_surplus_slides(&slides_dir, names.len())?;

    for (i, name) in names.iter().enumerate() {
        let rendered = slides::render_name_slide(&template_slide, name)?;
        fs::write(slides_dir.join(slides::slide_filename(i + 1)), rendered)?;
    }

    // All generated slides share the first slide's styling relationships.
    let sidecar = workdir.join(TEMPLATE_SLIDE_RELS_PART);
    if !sidecar.is_file() {
        return Err(PipelineError::MissingPart(
            TEMPLATE_SLIDE_RELS_PART.to_string(),
        ));
    }
    for i in 2..=names.len() {
        let dest = workdir
            .join(SLIDE_RELS_DIR)
            .join(format!("{}.rels", slides::slide_filename(i)));
        fs::copy(&sidecar, dest)?;
    }

    let rels_xml = read_part(workdir, PRESENTATION_RELS_PART)?;
    let (new_rels, remap) = slides::rewrite_relationships_xml(&rels_xml, names.len())?;

    let presentation_xml = read_part(workdir, PRESENTATION_PART)?;
    let new_presentation =
        slides::rewrite_presentation_xml(&presentation_xml, names.len(), &remap)?;

    let content_types_xml = read_part(workdir, CONTENT_TYPES_PART)?;
    let new_content_types = slides::rewrite_content_types_xml(&content_types_xml, names.len())?;

    fs::write(workdir.join(PRESENTATION_RELS_PART), new_rels)?;
    fs::write(workdir.join(PRESENTATION_PART), new_presentation)?;
    fs::write(workdir.join(CONTENT_TYPES_PART), new_content_types)?;

    tracing::debug!(slides = names.len(), "slides materialized");
    Ok(())
}

/// Read an internal part, failing with [`PipelineError::MissingPart`] if it
/// is absent.
fn read_part(workdir: &Path, part: &str) -> Result<String, PipelineError> {
    let path = workdir.join(part);
    if !path.is_file() {
        return Err(PipelineError::MissingPart(part.to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Delete template slides (and their sidecars) whose index exceeds `keep`.
fn remove_surplus_slides(slides_dir: &Path, keep: usize) -> Result<(), PipelineError> {
    if !slides_dir.is_dir() {
        return Err(PipelineError::MissingPart(SLIDES_DIR.to_string()));
    }
    for entry in fs::read_dir(slides_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(index) = parse_slide_index(&file_name.to_string_lossy()) else {
            continue;
        };
        if index > keep {
            fs::remove_file(entry.path())?;
            let sidecar = slides_dir
                .join("_rels")
                .join(format!("{}.rels", file_name.to_string_lossy()));
            if sidecar.is_file() {
                fs::remove_file(sidecar)?;
            }
        }
    }
    Ok(())
}

/// `slide7.xml` -> `Some(7)`, anything else -> `None`.
fn parse_slide_index(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}
