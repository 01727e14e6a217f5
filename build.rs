use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const TREE_PATH: &str = "catalogs/format_tree.xml";

fn main() {
    let tree_path = Path::new(TREE_PATH);
    validate_tree_file(tree_path);
    set_build_dependencies();
}

fn validate_tree_file(tree_path: &Path) {
    // Ensure the hierarchy exists at build time
    assert!(
        tree_path.exists(),
        "\n\nFORMAT TREE BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the format tree file before building.\n",
        tree_path.display()
    );

    let contents = std::fs::read_to_string(tree_path).unwrap_or_else(|e| {
        panic!(
            "\n\nFORMAT TREE BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            tree_path.display()
        );
    });

    let total = validate_tree_structure(&contents);

    println!("cargo:warning=Validated format tree: {total} formats");
}

/// Walk the document, checking nesting and that every node names a format.
/// Returns the number of format nodes.
fn validate_tree_structure(contents: &str) -> usize {
    let mut reader = Reader::from_str(contents);
    let mut depth = 0usize;
    let mut roots = 0usize;
    let mut formats = 0usize;

    loop {
        let event = reader.read_event().unwrap_or_else(|e| {
            panic!(
                "\n\nFORMAT TREE BUILD ERROR: Invalid XML at byte {}\n\
                 Error: {e}\n\
                 Hint: Check for unclosed or mismatched <format> tags.\n",
                reader.error_position()
            );
        });

        match event {
            Event::Start(ref e) => {
                check_node(e, depth, &mut roots, &mut formats);
                depth += 1;
            }
            Event::Empty(ref e) => {
                check_node(e, depth, &mut roots, &mut formats);
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    assert!(
        depth == 0,
        "\n\nFORMAT TREE BUILD ERROR: Document ends inside an element\n"
    );
    assert!(
        roots == 1,
        "\n\nFORMAT TREE BUILD ERROR: Expected exactly one root element, found {roots}\n"
    );
    assert!(
        formats > 0,
        "\n\nFORMAT TREE BUILD ERROR: The tree declares no formats\n"
    );

    formats
}

fn check_node(e: &BytesStart<'_>, depth: usize, roots: &mut usize, formats: &mut usize) {
    if depth == 0 {
        *roots += 1;
        return;
    }

    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    assert!(
        name == "format",
        "\n\nFORMAT TREE BUILD ERROR: Unexpected element <{name}>\n\
         Only <format> nodes may appear below the root.\n"
    );

    let has_name = e.attributes().flatten().any(|a| {
        a.key.local_name().as_ref() == b"format" && !a.value.is_empty()
    });
    assert!(
        has_name,
        "\n\nFORMAT TREE BUILD ERROR: <format> node {} has no 'format' attribute\n",
        *formats + 1
    );

    *formats += 1;
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the hierarchy changes
    println!("cargo:rerun-if-changed={TREE_PATH}");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
