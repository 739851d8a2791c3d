use std::rc::Rc;
use std::time::{Duration, Instant};

use pure_flow::{
    FlowOptions, HyperlinkSettings, Locator, Paragraph, ResourceCache, TextFlow, Theme,
    flow_from_document,
};
use ratatui::{buffer::Buffer, layout::Rect};
use tdoc::{Document, InlineStyle, Paragraph as DocParagraph, ParagraphType, Span};

/// Performance benchmark suite for paragraph flow operations
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Text ingestion with URL detection
/// - Layout of whole flows
/// - Painting scrolled viewports
/// - Selection passes
/// - Relayout after font changes
const SMALL_FLOW_PARAGRAPHS: usize = 10;
const MEDIUM_FLOW_PARAGRAPHS: usize = 100;
const LARGE_FLOW_PARAGRAPHS: usize = 1000;
const HUGE_FLOW_PARAGRAPHS: usize = 10000;

const ITERATIONS: usize = 100;

const SAMPLE_WORDS: &[&str] = &[
    "Lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "http://example.com/lorem",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "http://example.org/a/much/longer/path",
    "Ut",
    "enim",
    "ad",
    "minim",
    "veniam",
];

fn sample_text(words: usize) -> String {
    let mut text = String::new();
    for j in 0..words {
        if j > 0 {
            text.push(' ');
        }
        text.push_str(SAMPLE_WORDS[j % SAMPLE_WORDS.len()]);
    }
    text
}

/// Create a flow with the specified number of plain paragraphs
fn create_test_flow(num_paragraphs: usize, avg_words_per_para: usize) -> TextFlow {
    let mut flow = TextFlow::default();
    let text = sample_text(avg_words_per_para);
    for i in 0..num_paragraphs {
        flow.add_text(&text, i % 3 == 0);
    }
    flow
}

/// Create a document with headers, code, lists and mixed inline styles
fn create_styled_document(num_paragraphs: usize) -> Document {
    let mut doc = Document::new();

    for i in 0..num_paragraphs {
        let text = format!(
            "This is paragraph {} with some bold and italic text, a link to http://example.com/{} and maybe some code.",
            i, i
        );

        let paragraph = match i % 6 {
            0 => DocParagraph::new(ParagraphType::Header2)
                .with_content(vec![Span::new_text(&format!("Section {}", i))]),
            1 => DocParagraph::new(ParagraphType::CodeBlock)
                .with_content(vec![Span::new_text("fn main() {\n    run();\n}")]),
            2 => DocParagraph::new_unordered_list().with_entries(vec![
                vec![DocParagraph::new_text().with_content(vec![Span::new_text(&text)])],
                vec![DocParagraph::new_text().with_content(vec![Span::new_text("second")])],
            ]),
            3 => DocParagraph::new_text().with_content(vec![
                Span::new_styled(InlineStyle::Bold)
                    .with_children(vec![Span::new_styled(InlineStyle::Italic).with_text(&text)]),
            ]),
            _ => DocParagraph::new_text().with_content(vec![Span::new_text(&text)]),
        };
        doc.add_paragraph(paragraph);
    }

    doc
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);
        println!(
            "Ops/sec:        {:.2}",
            1_000_000.0 / self.avg_duration.as_micros().max(1) as f64
        );

        if self.avg_duration.as_millis() > 100 {
            println!("\n⚠️  WARNING: Average duration > 100ms (user-perceptible lag)");
        } else if self.avg_duration.as_millis() > 16 {
            println!("\n⚠️  WARNING: Average duration > 16ms (may drop frames)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    // Warmup
    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn iterations_for(paragraphs: usize) -> usize {
    if paragraphs >= HUGE_FLOW_PARAGRAPHS {
        10
    } else {
        ITERATIONS
    }
}

#[test]
fn bench_ingest_text() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              TEXT INGESTION BENCHMARKS                         ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let settings = Rc::new(HyperlinkSettings::default());
    for words in [20, 200, 2000] {
        let text = sample_text(words);
        for expand_urls in [false, true] {
            let result = benchmark(
                &format!("ingest_text - {} words, expand_urls={}", words, expand_urls),
                ITERATIONS,
                || {
                    let mut paragraph = Paragraph::new(false);
                    paragraph.ingest_text(&text, expand_urls, &settings, None, None);
                    assert!(!paragraph.is_empty());
                },
            );
            result.print();
        }
    }
}

#[test]
fn bench_flow_layout() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║                 FLOW LAYOUT BENCHMARKS                         ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let sizes = [
        ("Small (10 paras)", SMALL_FLOW_PARAGRAPHS),
        ("Medium (100 paras)", MEDIUM_FLOW_PARAGRAPHS),
        ("Large (1000 paras)", LARGE_FLOW_PARAGRAPHS),
        ("Huge (10000 paras)", HUGE_FLOW_PARAGRAPHS),
    ];

    for (name, paragraphs) in sizes {
        let mut flow = create_test_flow(paragraphs, 40);
        let result = benchmark(
            &format!("layout - {}", name),
            iterations_for(paragraphs),
            || {
                flow.layout(80);
            },
        );
        result.print();
    }
}

#[test]
fn bench_styled_document_layout() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║          STYLED DOCUMENT IMPORT AND LAYOUT                     ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for paragraphs in [SMALL_FLOW_PARAGRAPHS, MEDIUM_FLOW_PARAGRAPHS, LARGE_FLOW_PARAGRAPHS] {
        let doc = create_styled_document(paragraphs);
        let result = benchmark(
            &format!("flow_from_document + layout - {} blocks", paragraphs),
            ITERATIONS,
            || {
                let mut flow = flow_from_document(&doc, Theme::default(), FlowOptions::default());
                flow.layout(80);
            },
        );
        result.print();
    }
}

#[test]
fn bench_wrap_width_impact() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║                WRAP WIDTH IMPACT                               ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let mut flow = create_test_flow(MEDIUM_FLOW_PARAGRAPHS, 60);
    for width in [20, 40, 80, 120, 200] {
        let result = benchmark(&format!("layout - width {}", width), ITERATIONS, || {
            flow.layout(width);
        });
        result.print();
    }
}

#[test]
fn bench_row_height_measurement() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              ROW HEIGHT MEASUREMENT                            ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let settings = Rc::new(HyperlinkSettings::default());
    let resources = ResourceCache::default();
    let mut paragraph = Paragraph::new(false);
    paragraph.ingest_text(&sample_text(2000), true, &settings, None, None);

    let result = benchmark("compute_row_heights - 2000 words", ITERATIONS, || {
        let mut loc = Locator::new(1, 0);
        paragraph.compute_row_heights(80, &mut loc, &resources);
        assert!(loc.has_heights());
    });
    result.print();
}

#[test]
fn bench_paint_viewport() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║                VIEWPORT PAINT BENCHMARKS                       ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let mut flow = create_test_flow(LARGE_FLOW_PARAGRAPHS, 40);
    let height = flow.layout(80);
    let area = Rect::new(0, 0, 80, 40);
    let mut buf = Buffer::empty(area);

    let scrolls = [
        ("top", 0),
        ("middle", height / 2),
        ("bottom", height.saturating_sub(40)),
    ];
    for (label, scroll) in scrolls {
        let result = benchmark(&format!("paint - scrolled to {}", label), ITERATIONS, || {
            flow.paint(&mut buf, area, scroll);
        });
        result.print();
    }

    flow.focus_next_link();
    let result = benchmark("paint - with focused link", ITERATIONS, || {
        flow.paint(&mut buf, area, 0);
    });
    result.print();
}

#[test]
fn bench_selection() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║                   SELECTION BENCHMARKS                         ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let mut flow = create_test_flow(LARGE_FLOW_PARAGRAPHS, 40);
    let height = flow.layout(80);
    flow.start_selection(0, 0);

    for rows in [10, 100, height] {
        let result = benchmark(&format!("extend_selection - {} rows", rows), ITERATIONS, || {
            flow.extend_selection(40, rows);
        });
        result.print();
    }

    let result = benchmark("selected_text - whole flow", ITERATIONS, || {
        assert!(flow.selected_text().is_some());
    });
    result.print();
}

#[test]
fn bench_font_change_relayout() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              FONT CHANGE AND RELAYOUT                          ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let mut flow = create_test_flow(MEDIUM_FLOW_PARAGRAPHS, 40);
    flow.layout(80);

    let cached = benchmark("layout - cached fragments", ITERATIONS, || {
        flow.layout(80);
    });
    cached.print();

    let cleared = benchmark("clear_font_cache + layout", ITERATIONS, || {
        flow.clear_font_cache(None);
        flow.layout(80);
    });
    cleared.print();
}
