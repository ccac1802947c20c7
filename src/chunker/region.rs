use super::ChunkMode;
use scraper::{ElementRef, Html};

/// Subtrees whose children are chunked, in document order.
///
/// Text mode picks the first `<main>`, falling back to `<body>`. Markup mode
/// takes the `<head>` and `<body>` children of the root. An empty result
/// means the document had nothing to chunk.
pub(crate) fn locate(document: &Html, mode: ChunkMode) -> Vec<ElementRef<'_>> {
    let root = document.root_element();
    match mode {
        ChunkMode::Text => first_named(root, "main")
            .or_else(|| first_named(root, "body"))
            .into_iter()
            .collect(),
        ChunkMode::Markup => root
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "head" | "body"))
            .collect(),
    }
}

fn first_named<'a>(root: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    if root.value().name() == name {
        return Some(root);
    }
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
}
