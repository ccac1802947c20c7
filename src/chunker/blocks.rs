use super::{ChunkMode, ChunkerConfig};
use scraper::{ElementRef, Node};

/// Elements whose text never reaches the rendered page
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A structural element and its serialized content
pub(crate) struct Block<'a> {
    pub element: ElementRef<'a>,
    pub content: String,
}

/// Direct children of `parent` whose tag is structural, boilerplate included.
pub(crate) fn structural_children<'a, 'c>(
    parent: ElementRef<'a>,
    config: &'c ChunkerConfig,
) -> impl Iterator<Item = ElementRef<'a>> + 'c
where
    'a: 'c,
{
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| config.is_block_tag(el.value().name()))
}

/// Lazily enumerate the blocks under `parent`: structural, not boilerplate,
/// and with non-empty content.
pub(crate) fn blocks<'a, 'c>(
    parent: ElementRef<'a>,
    config: &'c ChunkerConfig,
) -> impl Iterator<Item = Block<'a>> + 'c
where
    'a: 'c,
{
    structural_children(parent, config)
        .filter(move |el| !is_boilerplate(*el, config))
        .filter_map(move |element| Block::new(element, config.mode))
}

impl<'a> Block<'a> {
    /// Serialize `element`, or `None` when it has nothing to contribute.
    pub fn new(element: ElementRef<'a>, mode: ChunkMode) -> Option<Self> {
        if mode == ChunkMode::Markup && !has_children(element) {
            return None;
        }
        let content = serialize(element, mode);
        (!content.trim().is_empty()).then_some(Self { element, content })
    }

    pub fn tag(&self) -> &str {
        self.element.value().name()
    }
}

/// Serialize an element for the given mode.
fn serialize(element: ElementRef<'_>, mode: ChunkMode) -> String {
    match mode {
        ChunkMode::Text => visible_text(element),
        ChunkMode::Markup => element.html(),
    }
}

/// Visible text with every whitespace run collapsed to a single space.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let mut words = Vec::new();
    collect_words(element, &mut words);
    words.join(" ")
}

fn collect_words<'a>(element: ElementRef<'a>, words: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => words.extend(text.split_whitespace()),
            Node::Element(el) if INVISIBLE_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_words(child, words);
                }
            }
            _ => {}
        }
    }
}

fn has_children(element: ElementRef<'_>) -> bool {
    element.children().any(|child| match child.value() {
        Node::Element(_) => true,
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

fn is_boilerplate(element: ElementRef<'_>, config: &ChunkerConfig) -> bool {
    if config.stoplist.is_empty() {
        return false;
    }
    let value = element.value();
    value.classes().any(|class| config.is_stopword(class))
        || value.id().is_some_and(|id| config.is_stopword(id))
}

#[cfg(test)]
mod block_tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(document: &'a Html, selector: &str) -> ElementRef<'a> {
        let selector = Selector::parse(selector).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_visible_text_skips_scripts_and_collapses_whitespace() {
        let document = Html::parse_document(
            "<div id=\"x\">  Register\n\n  <b>today</b><script>var a = 1;</script>\
             <style>p{}</style> now </div>",
        );

        assert_eq!(visible_text(first(&document, "#x")), "Register today now");
    }

    #[test]
    fn test_blocks_are_direct_children_only() {
        let document = Html::parse_document(
            "<main><div>one<div>nested</div></div><p>not a block</p><section>two</section></main>",
        );
        let config = ChunkerConfig::text();

        let tags: Vec<String> = blocks(first(&document, "main"), &config)
            .map(|b| b.tag().to_string())
            .collect();

        assert_eq!(tags, vec!["div", "section"]);
    }

    #[test]
    fn test_stoplist_matches_class_or_id() {
        let document = Html::parse_document(
            "<main><div class=\"navbar top\">menu</div><div id=\"footer\">foot</div>\
             <div class=\"navigation\">kept</div></main>",
        );
        let config = ChunkerConfig::text();

        let texts: Vec<String> = blocks(first(&document, "main"), &config)
            .map(|b| b.content)
            .collect();

        assert_eq!(texts, vec!["kept"]);
    }

    #[test]
    fn test_empty_blocks_are_skipped() {
        let document = Html::parse_document("<main><div>   </div><div><img src=\"a.png\"></div></main>");
        let config = ChunkerConfig::text();

        assert_eq!(blocks(first(&document, "main"), &config).count(), 0);
    }

    #[test]
    fn test_markup_serialization_keeps_tags() {
        let document = Html::parse_document("<body><div class=\"c\"><img src=\"a.png\"></div></body>");
        let config = ChunkerConfig::markup();

        let block = blocks(first(&document, "body"), &config).next().unwrap();
        assert_eq!(block.content, "<div class=\"c\"><img src=\"a.png\"></div>");
    }

    #[test]
    fn test_markup_skips_childless_elements() {
        let document = Html::parse_document("<body><div class=\"spacer\"></div><div>x</div></body>");
        let config = ChunkerConfig::markup();

        let texts: Vec<String> = blocks(first(&document, "body"), &config)
            .map(|b| b.content)
            .collect();
        assert_eq!(texts, vec!["<div>x</div>"]);
    }
}
