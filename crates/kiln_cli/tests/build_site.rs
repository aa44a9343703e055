//! End-to-end builds of a small blog.

use std::path::Path;
use std::time::{Duration, SystemTime};

use kiln_cli::build::{build_site, BuildOptions, BuildSummary};
use kiln_cli::clean::clean_site;
use kiln_cli::inspect::load_context;
use kiln_cli::project::Project;

const CONFIG: &str = r#"
[site]
name = "Field Notes"
templates = "templates/default.html"

[[listings]]
url = "index.html"
pages = "posts"
item_templates = "templates/item.html"
templates = "templates/default.html"

[listings.fields]
title = "Recent posts"
"#;

fn set_mtime(path: &Path, time: SystemTime) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Directories cannot be opened for writing; a read handle is enough to set
/// the modification time.
fn set_dir_mtime(path: &Path, time: SystemTime) {
    std::fs::File::open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Writes `rel` under `root`, dated an hour ago, leaving its directory's
/// modification time at "now".
fn add_old(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    set_mtime(&path, an_hour_ago());
}

fn an_hour_ago() -> SystemTime {
    SystemTime::now() - Duration::from_secs(3600)
}

/// Creates the blog with every source file dated an hour ago.
fn blog(root: &Path) -> Project {
    let files = [
        ("kiln.toml", CONFIG),
        (
            "templates/default.html",
            "<title>$title$ - $site$</title><a href=\"$root$/index.html\">home</a>$body$",
        ),
        ("templates/item.html", "<li>$title$</li>"),
        ("pages/about.md", "---\ntitle: About\n---\nWho *we* are.\n"),
        ("pages/posts/first.md", "---\ntitle: First\n---\nHello.\n"),
        ("pages/posts/second.md", "---\ntitle: Second\n---\nAgain.\n"),
    ];
    for (rel, contents) in files {
        add_old(root, rel, contents);
    }
    backdate_dirs(&root.join("pages"));
    Project::open(root).unwrap()
}

/// Dates `dir` and every directory below it an hour ago.
fn backdate_dirs(dir: &Path) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            backdate_dirs(&path);
        }
    }
    set_dir_mtime(dir, an_hour_ago());
}

fn summary(built: usize, cached: usize, skipped: usize) -> BuildSummary {
    BuildSummary {
        built,
        cached,
        skipped,
        removed: 0,
    }
}

fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn first_build_renders_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(4, 0, 0));

    let about = read(dir.path(), "_site/about.html");
    assert!(about.starts_with("<title>About - Field Notes</title>"), "{about}");
    assert!(about.contains("<a href=\"./index.html\">"), "{about}");
    assert!(about.contains("<em>we</em>"), "{about}");

    let first = read(dir.path(), "_site/posts/first.html");
    assert!(first.contains("<a href=\"../index.html\">"), "{first}");

    let index = read(dir.path(), "_site/index.html");
    assert!(
        index.contains("<title>Recent posts - Field Notes</title>"),
        "{index}"
    );
    assert!(index.contains("<li>First</li><li>Second</li>"), "{index}");
}

#[test]
fn unchanged_site_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());

    build_site(&project, BuildOptions::default()).unwrap();
    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(0, 0, 4));
}

#[test]
fn deleted_output_is_restored_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());

    build_site(&project, BuildOptions::default()).unwrap();
    let before = read(dir.path(), "_site/about.html");
    std::fs::remove_file(dir.path().join("_site/about.html")).unwrap();

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(0, 1, 3));
    assert_eq!(read(dir.path(), "_site/about.html"), before);
}

#[test]
fn touched_post_rebuilds_post_and_listing() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    let post = dir.path().join("pages/posts/first.md");
    std::fs::write(&post, "---\ntitle: First, revised\n---\nHello again.\n").unwrap();
    set_mtime(&post, SystemTime::now() + Duration::from_secs(3600));

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(2, 0, 2));
    assert!(read(dir.path(), "_site/posts/first.html").contains("First, revised"));
    assert!(read(dir.path(), "_site/index.html").contains("<li>First, revised</li>"));
}

#[test]
fn touched_layout_rerenders_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    let layout = dir.path().join("templates/default.html");
    std::fs::write(&layout, "<main>$body$</main>").unwrap();
    set_mtime(&layout, SystemTime::now() + Duration::from_secs(3600));

    // The layout is applied after the cache, so every context is reused.
    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(0, 4, 0));
    assert!(read(dir.path(), "_site/about.html").starts_with("<main>"));
}

#[test]
fn touched_item_template_rebuilds_listing() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    let template = dir.path().join("templates/item.html");
    std::fs::write(&template, "<li class=\"post\">$title$</li>").unwrap();
    set_mtime(&template, SystemTime::now() + Duration::from_secs(3600));

    // Item templates feed the listing body, so only the listing is rebuilt.
    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(1, 0, 3));
    assert!(read(dir.path(), "_site/index.html").contains("<li class=\"post\">First</li>"));
}

#[test]
fn force_rebuilds_everything() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    let result = build_site(&project, BuildOptions { force: true }).unwrap();
    assert_eq!(result, summary(4, 0, 0));
}

#[test]
fn cached_contexts_are_inspectable() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    let post = load_context(&project, "posts/second.html").unwrap();
    assert_eq!(post.get("title"), Some("Second"));
    assert_eq!(post.get("root"), Some(".."));
    assert_eq!(post.get("site"), Some("Field Notes"));

    let index = load_context(&project, "index.html").unwrap();
    assert_eq!(index.get("url"), Some("index.html"));
    assert_eq!(index.get("body"), Some("<li>First</li><li>Second</li>"));
}

#[test]
fn clean_then_build_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    clean_site(&project).unwrap();
    assert!(!dir.path().join("_site").exists());

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(4, 0, 0));
}

#[test]
fn removed_post_drops_from_listing_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    std::fs::remove_file(dir.path().join("pages/posts/second.md")).unwrap();

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(
        result,
        BuildSummary {
            removed: 1,
            ..summary(1, 0, 2)
        }
    );
    let index = read(dir.path(), "_site/index.html");
    assert!(index.contains("<li>First</li>"), "{index}");
    assert!(!index.contains("Second"), "{index}");
    assert!(!dir.path().join("_site/posts/second.html").exists());
    assert!(load_context(&project, "posts/second.html").is_err());

    backdate_dirs(&dir.path().join("pages"));
    let again = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(again, summary(0, 0, 3));
}

#[test]
fn removed_page_is_dropped_after_forced_build() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    std::fs::remove_file(dir.path().join("pages/about.md")).unwrap();

    let result = build_site(&project, BuildOptions { force: true }).unwrap();
    assert_eq!(
        result,
        BuildSummary {
            removed: 1,
            ..summary(3, 0, 0)
        }
    );
    assert!(!dir.path().join("_site/about.html").exists());
}

#[test]
fn added_post_with_old_timestamp_joins_listing() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    // Copies that keep their original timestamp are still picked up.
    add_old(
        dir.path(),
        "pages/posts/third.md",
        "---\ntitle: Third\n---\nOnce more.\n",
    );

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(2, 0, 2));
    assert!(read(dir.path(), "_site/posts/third.html").contains("Once more."));
    let index = read(dir.path(), "_site/index.html");
    assert!(
        index.contains("<li>First</li><li>Second</li><li>Third</li>"),
        "{index}"
    );
}

#[test]
fn post_added_to_nested_directory_joins_listing() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    add_old(
        dir.path(),
        "pages/posts/archive/older.md",
        "---\ntitle: Older\n---\nLong ago.\n",
    );
    backdate_dirs(&dir.path().join("pages"));
    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(5, 0, 0));

    // Only `posts/archive` changes; `posts` keeps its timestamp.
    add_old(
        dir.path(),
        "pages/posts/archive/oldest.md",
        "---\ntitle: Oldest\n---\nLonger ago.\n",
    );

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(2, 0, 4));
    let index = read(dir.path(), "_site/index.html");
    assert!(index.contains("<li>Oldest</li>"), "{index}");
}

#[test]
fn new_page_outside_listing_leaves_listing_alone() {
    let dir = tempfile::tempdir().unwrap();
    let project = blog(dir.path());
    build_site(&project, BuildOptions::default()).unwrap();

    add_old(dir.path(), "pages/contact.md", "---\ntitle: Contact\n---\nWrite us.\n");

    let result = build_site(&project, BuildOptions::default()).unwrap();
    assert_eq!(result, summary(1, 0, 4));
    assert!(read(dir.path(), "_site/contact.html").contains("Write us."));
}
