use super::splitter::split_by_tokens;
use super::*;
use crate::tokenizer::{self, Tokenizer};
use std::sync::Arc;

fn tokenizer() -> Arc<Tokenizer> {
    tokenizer::shared().unwrap()
}

fn chunk(html: &str, config: ChunkerConfig) -> Vec<Chunk> {
    HtmlChunker::new(config).unwrap().chunk(html)
}

fn texts(chunks: &[Chunk]) -> Vec<&str> {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

#[test]
fn test_single_short_block() {
    let chunks = chunk("<main><div>short text</div></main>", ChunkerConfig::text());

    assert_eq!(texts(&chunks), vec!["short text"]);
    assert_eq!(chunks[0].metadata.tag, "div");
    assert_eq!(chunks[0].metadata.depth, 0);
    assert!(!chunks[0].metadata.fallback);
}

#[test]
fn test_oversized_parent_splits_into_sections() {
    let sections = [
        "Voter registration closes twenty one days before every general election.",
        "Vote by mail ballots must be postmarked on or before Election Day itself.",
        "Polling places open at six in the morning and close at eight at night.",
    ];
    let html = format!(
        "<main><div><section>{}</section><section>{}</section><section>{}</section></div></main>",
        sections[0], sections[1], sections[2]
    );
    let tokenizer = tokenizer();
    let budget = sections.iter().map(|s| tokenizer.count(s)).max().unwrap();
    assert!(tokenizer.count(&sections.join(" ")) > budget);

    let chunks = chunk(&html, ChunkerConfig::text().max_tokens(budget));

    assert_eq!(texts(&chunks), sections.to_vec());
    for chunk in &chunks {
        assert_eq!(chunk.metadata.tag, "section");
        assert_eq!(chunk.metadata.depth, 1);
        assert!(chunk.metadata.token_count <= budget);
    }
}

#[test]
fn test_leaf_over_budget_uses_hard_fallback() {
    let text = format!("hello{}", " hello".repeat(11_999));
    assert_eq!(tokenizer().count(&text), 12_000);
    let html = format!("<main><section>{}</section></main>", text);

    let chunks = chunk(&html, ChunkerConfig::text());

    assert_eq!(chunks.len(), 3);
    for chunk in &chunks {
        assert!(chunk.metadata.fallback);
        assert!(chunk.metadata.token_count <= DEFAULT_TOKEN_BUDGET);
    }
    assert_eq!(chunks[2].metadata.token_count, 2_000);
    let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rebuilt, text);
}

#[test]
fn test_identical_blocks_emitted_once() {
    let html = "<main><div>Election Day is November 5</div>\
                <div>  Election Day is\n November 5 </div>\
                <div>Polls close at 8 p.m.</div></main>";

    let chunks = chunk(html, ChunkerConfig::text());

    assert_eq!(
        texts(&chunks),
        vec!["Election Day is November 5", "Polls close at 8 p.m."]
    );
}

#[test]
fn test_single_child_wrapper_over_budget_keeps_content() {
    let text = "Register to vote before the deadline. ".repeat(40);
    let html = format!(
        "<main><div class=\"container\"><div><section>{text}</section></div></div></main>"
    );

    let chunks = chunk(&html, ChunkerConfig::text().max_tokens(100));

    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|c| c.metadata.tag == "section"));
    assert!(chunks.iter().all(|c| c.metadata.depth == 2));
    assert!(chunks.iter().all(|c| c.metadata.token_count <= 100));
    let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rebuilt, text.trim());
}

#[test]
fn test_duplicates_under_descended_wrapper_emitted_once() {
    let filler = "Polling places open at seven in the morning. ".repeat(8);
    let html = format!(
        "<main><div><div><section>{filler}</section><section>{filler}</section></div></div></main>"
    );
    let budget = tokenizer().count(filler.trim());

    let chunks = chunk(&html, ChunkerConfig::text().max_tokens(budget));

    assert_eq!(texts(&chunks), vec![filler.trim()]);
    assert_eq!(chunks[0].metadata.depth, 2);
}

#[test]
fn test_markup_mode_keeps_duplicates() {
    let html = "<html><body><div>same</div><div>same</div></body></html>";

    let chunks = chunk(html, ChunkerConfig::markup());

    assert_eq!(texts(&chunks), vec!["<div>same</div>", "<div>same</div>"]);
}

#[test]
fn test_block_exactly_at_budget_is_not_split() {
    let text = "Check your registration status online before you head to the polls.";
    let budget = tokenizer().count(text);

    let chunks = chunk(
        &format!("<main><article>{}</article></main>", text),
        ChunkerConfig::text().max_tokens(budget),
    );

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata.token_count, budget);
    assert!(!chunks[0].metadata.fallback);
}

#[test]
fn test_empty_region_yields_no_chunks() {
    assert!(chunk("<main>   </main>", ChunkerConfig::text()).is_empty());
    assert!(chunk("<main><div> </div><section></section></main>", ChunkerConfig::text()).is_empty());
    assert!(chunk("", ChunkerConfig::text()).is_empty());
    assert!(chunk("", ChunkerConfig::markup()).is_empty());
}

#[test]
fn test_body_used_when_main_missing() {
    let html = "<html><body><div>first</div><article>second</article></body></html>";

    let chunks = chunk(html, ChunkerConfig::text());

    assert_eq!(texts(&chunks), vec!["first", "second"]);
}

#[test]
fn test_main_preferred_over_body() {
    let html = "<body><div>outside</div><main><div>inside</div></main></body>";

    let chunks = chunk(html, ChunkerConfig::text());

    assert_eq!(texts(&chunks), vec!["inside"]);
}

#[test]
fn test_region_without_blocks_is_one_block() {
    let html = "<main><h1>Vote</h1><p>Find your polling place.</p></main>";

    let chunks = chunk(html, ChunkerConfig::text());

    assert_eq!(texts(&chunks), vec!["Vote Find your polling place."]);
    assert_eq!(chunks[0].metadata.tag, "main");
}

#[test]
fn test_boilerplate_blocks_are_dropped() {
    let html = "<main><div class=\"nav\">Home | About</div>\
                <div id=\"sidebar\">Links</div>\
                <div class=\"content\">Real content</div>\
                <div class=\"footer\">Copyright</div></main>";

    let chunks = chunk(html, ChunkerConfig::text());

    assert_eq!(texts(&chunks), vec!["Real content"]);
}

#[test]
fn test_boilerplate_child_does_not_trigger_fallback() {
    let body = "word ".repeat(60);
    let html = format!(
        "<main><div><div class=\"footer\">{}</div><div>{}</div></div></main>",
        body, body
    );

    let chunks = chunk(&html, ChunkerConfig::text().max_tokens(80));

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata.depth, 1);
    assert!(!chunks[0].metadata.fallback);
}

#[test]
fn test_mixed_empty_children_produce_no_empty_chunks() {
    let first = "Early voting runs for nine days before the election.".repeat(4);
    let second = "Same-day registration is not available in this state.".repeat(4);
    let html = format!(
        "<main><div><div></div><div>{}</div><div>  </div><div>{}</div></div></main>",
        first, second
    );
    let tokenizer = tokenizer();
    let budget = tokenizer.count(&first).max(tokenizer.count(&second));

    let chunks = chunk(&html, ChunkerConfig::text().max_tokens(budget));

    assert_eq!(texts(&chunks), vec![first.as_str(), second.as_str()]);
}

#[test]
fn test_markup_mode_walks_head_and_body() {
    let html = "<html><head><title>Vote</title></head>\
                <body><div><img src=\"flag.png\"></div><li>item</li></body></html>";

    let chunks = chunk(html, ChunkerConfig::markup());

    assert_eq!(
        texts(&chunks),
        vec![
            "<head><title>Vote</title></head>",
            "<div><img src=\"flag.png\"></div>",
            "<li>item</li>",
        ]
    );
}

#[test]
fn test_markup_leaf_over_budget_is_sliced() {
    let paragraph = "<p>Bring a valid photo ID to your polling place.</p>".repeat(30);
    let html = format!("<html><body><div>{}</div></body></html>", paragraph);

    let chunks = chunk(&html, ChunkerConfig::markup().max_tokens(50));

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.metadata.fallback && c.metadata.token_count <= 50));
    let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rebuilt, format!("<div>{}</div>", paragraph));
}

#[test]
fn test_every_chunk_within_budget() {
    let mut html = String::from("<main>");
    for i in 0..12 {
        html.push_str(&format!(
            "<section><h2>Part {i}</h2><div>{}</div><article>{}<div>{}</div></article></section>",
            "Ballot drop boxes are available. ".repeat(i + 1),
            "Sample ballots are mailed ahead of time. ".repeat(i * 2 + 1),
            "County clerks certify results. ".repeat(i + 3),
        ));
    }
    html.push_str("</main>");
    let tokenizer = tokenizer();

    for budget in [1, 7, 20, 64, 500] {
        let chunks = chunk(&html, ChunkerConfig::text().max_tokens(budget));
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(tokenizer.count(&chunk.text) <= budget, "budget {budget}: {:?}", chunk);
        }
    }
}

#[test]
fn test_chunking_is_idempotent() {
    let html = "<main><div>a b c</div><section><div>nested</div><div>more</div></section>\
                <article>tail</article></main>";
    let chunker = HtmlChunker::new(ChunkerConfig::text().max_tokens(2)).unwrap();

    assert_eq!(chunker.chunk(html), chunker.chunk(html));
}

#[test]
fn test_zero_budget_is_treated_as_one() {
    let chunks = chunk("<main><div>one two three</div></main>", ChunkerConfig::text().max_tokens(0));

    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|c| c.metadata.token_count == 1));
}

#[test]
fn test_chunk_html_convenience() {
    let chunks = chunk_html("<main><div>hi</div></main>", ChunkerConfig::default()).unwrap();
    assert_eq!(texts(&chunks), vec!["hi"]);
}

#[test]
fn test_split_by_tokens_respects_character_boundaries() {
    let tokenizer = tokenizer();
    let text = "Votación anticipada: ¿dónde está mi casilla? ".repeat(40);

    let pieces = split_by_tokens(&tokenizer, &text, 8);

    assert!(pieces.len() > 1);
    assert!(pieces.iter().all(|p| tokenizer.count(p) <= 8));
    assert_eq!(pieces.concat(), text);
}

#[test]
fn test_split_by_tokens_empty_text() {
    assert!(split_by_tokens(&tokenizer(), "", 10).is_empty());
}
