use std::env;
use std::fs;
use std::path::Path;

/// Guides compiled into `crate::guides`. Each must exist in `docs/`.
const GUIDES: &[&str] = &["huffman-coding.md", "container-format.md"];

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let docs_out = Path::new(&out_dir).join("docs");
    fs::create_dir_all(&docs_out).expect("create OUT_DIR/docs");

    for name in GUIDES {
        let source = Path::new("docs").join(name);
        println!("cargo:rerun-if-changed={}", source.display());

        // A packaged crate without docs/ still has to build.
        let content = fs::read_to_string(&source)
            .unwrap_or_else(|_| format!("# {name}\n\nGuide not available in this build.\n"));
        fs::write(docs_out.join(name), rewrite_guide_links(&content)).expect("write guide");
    }
}

/// Turn `[text](./other-guide.md)` into `[text](crate::guides::other_guide)`
/// so links between guides resolve in rustdoc.
fn rewrite_guide_links(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("](./") {
        out.push_str(&rest[..start + 2]);
        let target = &rest[start + 4..];
        match target.find(".md)") {
            Some(end) if !target[..end].contains(')') => {
                out.push_str("crate::guides::");
                out.push_str(&target[..end].replace('-', "_"));
                out.push(')');
                rest = &target[end + 4..];
            }
            _ => {
                out.push_str("./");
                rest = target;
            }
        }
    }

    out.push_str(rest);
    out
}
