//! Shared helpers for pipeline integration tests: a minimal template deck,
//! fake converter binaries, and a progress store that records every update.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use kuvertki_core::progress::{JobProgress, ProgressStore};
use kuvertki_pipeline::GenerationConfig;

pub const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
    r#"<Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
    r#"<Override PartName="/ppt/slides/slide2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
    r#"</Types>"#,
);

pub const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>"#,
    r#"</Relationships>"#,
);

pub const PRESENTATION: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
    r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>"#,
    r#"<p:sldSz cx="12192000" cy="6858000"/>"#,
    r#"</p:presentation>"#,
);

pub const PRESENTATION_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>"#,
    r#"<Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps" Target="presProps.xml"/>"#,
    r#"</Relationships>"#,
);

pub const SLIDE: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
    r#"<p:txBody><a:p>"#,
    r#"<a:r><a:rPr lang="ru-RU" sz="4400" dirty="0"/><a:t>ИМЯ</a:t></a:r>"#,
    r#"</a:p><a:p>"#,
    r#"<a:r><a:rPr lang="en-US"/><a:t>Добро пожаловать в EY Academy!</a:t></a:r>"#,
    r#"</a:p></p:txBody></p:sld>"#,
);

pub const SLIDE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    r#"</Relationships>"#,
);

/// Write a minimal two-slide template deck at `path`.
pub fn write_template_deck(path: &Path) {
    let file = fs::File::create(path).expect("create template zip");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let parts: &[(&str, &str)] = &[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("ppt/presentation.xml", PRESENTATION),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
        ("ppt/slides/slide1.xml", SLIDE),
        ("ppt/slides/slide2.xml", SLIDE),
        ("ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS),
        ("ppt/slides/_rels/slide2.xml.rels", SLIDE_RELS),
    ];
    for (name, content) in parts {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip");
}

/// Write a template deck missing the first slide document.
pub fn write_template_deck_without_slide(path: &Path) {
    let file = fs::File::create(path).expect("create template zip");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("ppt/presentation.xml", PRESENTATION),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
    ] {
        zip.start_file(name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip");
}

/// Write an executable stand-in for the converter that produces a fake PDF
/// next to where a real headless run would.
#[cfg(unix)]
pub fn write_fake_soffice(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-soffice.sh",
        concat!(
            "#!/bin/sh\n",
            "# args: --headless --convert-to pdf --outdir <dir> <deck>\n",
            "dir=\"$5\"\n",
            "deck=\"$6\"\n",
            "base=$(basename \"$deck\" .pptx)\n",
            "printf '%s' '%PDF-1.4 fake kuvertki output' > \"$dir/$base.pdf\"\n",
        ),
    )
}

/// Write an executable stand-in for a hung converter.
#[cfg(unix)]
pub fn write_hanging_soffice(dir: &Path) -> PathBuf {
    write_script(dir, "hanging-soffice.sh", "#!/bin/sh\nsleep 30\n")
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

/// A [`GenerationConfig`] wired to directories owned by the test.
pub fn test_config(
    template: &Path,
    output_dir: &Path,
    work_root: &Path,
    soffice_bin: &str,
) -> GenerationConfig {
    GenerationConfig {
        template_path: template.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        work_root: work_root.to_path_buf(),
        soffice_bin: soffice_bin.to_string(),
        convert_timeout: Duration::from_secs(10),
    }
}

/// Progress store that records every update, for asserting milestone
/// sequences.
#[derive(Default)]
pub struct RecordingStore {
    pub updates: Mutex<Vec<(i32, String)>>,
    pub file: Mutex<Option<PathBuf>>,
}

impl ProgressStore for RecordingStore {
    fn set_progress(&self, _job_id: &str, percent: i32, message: &str) {
        self.updates
            .lock()
            .unwrap()
            .push((percent, message.to_string()));
    }

    fn set_file(&self, _job_id: &str, file: &Path) {
        *self.file.lock().unwrap() = Some(file.to_path_buf());
    }

    fn get(&self, _job_id: &str) -> JobProgress {
        let updates = self.updates.lock().unwrap();
        let (percent, message) = updates.last().cloned().unwrap_or((-1, String::new()));
        JobProgress {
            percent,
            message,
            file: self.file.lock().unwrap().clone(),
        }
    }
}
