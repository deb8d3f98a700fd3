//! Shared helpers for API integration tests.
//!
//! Builds the full application router the way `main.rs` does (same
//! middleware stack, same state wiring) against a throwaway template deck
//! and a fake converter, so tests exercise real request/response behaviour
//! without LibreOffice.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use kuvertki_api::config::ServerConfig;
use kuvertki_api::jobs::JobRunner;
use kuvertki_api::routes;
use kuvertki_api::state::AppState;
use kuvertki_core::progress::{InMemoryProgressStore, ProgressStore};

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
    r#"<Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
    r#"</Types>"#,
);

const PRESENTATION: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    r#"<p:sldIdLst><p:sldId id="256" r:id="rId1"/></p:sldIdLst>"#,
    r#"</p:presentation>"#,
);

const PRESENTATION_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>"#,
    r#"</Relationships>"#,
);

const SLIDE: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
    r#"<p:txBody><a:p><a:r><a:rPr lang="ru-RU" sz="4400"/><a:t>ИМЯ</a:t></a:r></a:p></p:txBody>"#,
    r#"</p:sld>"#,
);

const SLIDE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    r#"</Relationships>"#,
);

fn write_template_deck(path: &Path) {
    let file = fs::File::create(path).expect("create template zip");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("ppt/presentation.xml", PRESENTATION),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
        ("ppt/slides/slide1.xml", SLIDE),
        ("ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS),
    ] {
        zip.start_file(name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip");
}

#[cfg(unix)]
fn write_fake_soffice(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-soffice.sh");
    fs::write(
        &path,
        concat!(
            "#!/bin/sh\n",
            "# args: --headless --convert-to pdf --outdir <dir> <deck>\n",
            "dir=\"$5\"\n",
            "deck=\"$6\"\n",
            "base=$(basename \"$deck\" .pptx)\n",
            "printf '%s' '%PDF-1.4 fake kuvertki output' > \"$dir/$base.pdf\"\n",
        ),
    )
    .expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

/// A fully wired application plus the temp directories that back it.
pub struct TestApp {
    pub router: Router,
    _dirs: TempDir,
}

/// Build the app with a working fake converter.
#[cfg(unix)]
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Build the app, letting the caller tweak the config before wiring.
#[cfg(unix)]
pub fn build_test_app_with(tweak: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dirs = TempDir::new().expect("create test dirs");
    let template_path = dirs.path().join("template.pptx");
    write_template_deck(&template_path);
    let soffice = write_fake_soffice(dirs.path());

    let output_dir = dirs.path().join("output");
    let work_root = dirs.path().join("work");
    fs::create_dir_all(&output_dir).expect("create output dir");
    fs::create_dir_all(&work_root).expect("create work root");

    let mut config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["*".into()],
        request_timeout_secs: 30,
        template_path,
        output_dir,
        work_root,
        soffice_bin: soffice.to_string_lossy().into_owned(),
        max_concurrent_jobs: 2,
        convert_timeout_secs: 10,
    };
    tweak(&mut config);

    let config = Arc::new(config);
    let progress: Arc<dyn ProgressStore> = Arc::new(InMemoryProgressStore::new());
    let jobs = Arc::new(JobRunner::new(
        config.max_concurrent_jobs,
        Arc::clone(&progress),
        config.generation(),
    ));
    let state = AppState {
        config: Arc::clone(&config),
        progress,
        jobs,
    };

    let request_id_header = HeaderName::from_static("x-request-id");
    let router = Router::new()
        .merge(routes::app_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    TestApp {
        router,
        _dirs: dirs,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, path: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request")
}

pub async fn head(app: &Router, path: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::HEAD)
                .uri(path)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request")
}

pub async fn post_form(app: &Router, path: &str, body: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(path)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .expect("build request"),
        )
        .await
        .expect("send request")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("parse JSON body")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("utf-8 body")
}
