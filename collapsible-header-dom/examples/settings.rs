use collapsible_header::{CollapseOptions, tags};
use collapsible_header_dom::{COLLAPSE_ATTRIBUTE, CONTENT, Document, Driver, NodeId, PAGE};

fn toolbar(doc: &mut Document, header: NodeId, height: f64) -> NodeId {
    let toolbar = doc.element(header, tags::TOOLBAR);
    doc.set_height(toolbar, height);
    doc.element(toolbar, tags::TOOLBAR_BACKGROUND);
    toolbar
}

fn main() {
    // Example: an iOS-style "Settings" page driven without any UI toolkit.
    //
    // An adapter would:
    // - build (or mirror) the page tree
    // - call update() once the condensing header is attached
    // - forward scroll offsets; each one flushes a frame of style writes
    let mut doc = Document::new(375.0, 800.0);
    let root = doc.root();
    let page = doc.element(root, PAGE);

    let primary = doc.element(page, tags::HEADER);
    let primary_toolbar = toolbar(&mut doc, primary, 44.0);
    let small_title = doc.element(primary_toolbar, tags::TITLE);
    doc.set_text(small_title, "Settings");

    let content = doc.element(page, CONTENT);
    doc.set_height(content, 756.0);
    let condensing = doc.element(content, tags::HEADER);
    doc.set_attribute(condensing, COLLAPSE_ATTRIBUTE, "condense");
    let large_toolbar = toolbar(&mut doc, condensing, 52.0);
    let large_title = doc.element(large_toolbar, tags::TITLE);
    doc.set_text(large_title, "Settings");
    doc.set_height(large_title, 40.0);
    toolbar(&mut doc, condensing, 44.0);
    for _ in 0..40 {
        let row = doc.element(content, "item");
        doc.set_height(row, 44.0);
    }

    let mut driver = Driver::new(doc, condensing, CollapseOptions::condense());
    match driver.update() {
        Ok(state) => println!("state={state:?}"),
        Err(err) => {
            println!("setup skipped: {err}");
            return;
        }
    }

    let clone = driver.document().mirrors().first().copied();
    for offset in [0.0, 20.0, 44.0, 54.0, 64.0, 84.0, 200.0] {
        driver.scroll_to(offset);
        let doc = driver.document();
        let transform = clone.and_then(|c| doc.style(c, "transform")).unwrap_or("-");
        println!(
            "off={offset} transform={transform} snapshot={:?}",
            driver.snapshot()
        );
    }

    driver.scroll_to(0.0);
    println!("back at top: {:?}", driver.snapshot());

    driver.detach();
    println!("detached: mirrors={}", driver.document().mirrors().len());
}
