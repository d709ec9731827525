mod common;

use boxflow::{Document, LayoutConfig, LayoutEngine, LayoutError, Rect, Size};
use common::{TestResult, engine, init_logs, new_body};

const MENU: &str = r#"{
    "tag": "body",
    "style": { "width": 200, "font-size": "10px" },
    "children": [
        { "tag": "div", "id": "menu", "style": "height: 30px" },
        { "tag": "p", "children": ["hello"] }
    ]
}"#;

#[test]
fn test_layout_json_reports_geometry() -> TestResult {
    init_logs();
    let laid_out = boxflow::layout_json(&engine(), MENU, Size::new(400.0, 300.0))?;
    let geometry = laid_out.geometry();

    assert_eq!(geometry[0].address, "body");
    assert_eq!(geometry[0].border_box, Rect::new(0.0, 0.0, 200.0, 42.0));
    let menu = geometry
        .iter()
        .find(|g| g.address == "div#menu < body")
        .ok_or("menu missing from geometry")?;
    assert_eq!(menu.depth, 1);
    assert_eq!(menu.border_box, Rect::new(0.0, 0.0, 200.0, 30.0));
    assert_eq!(menu.to_string(), "  div#menu < body [0.00, 0.00, 200.00 x 30.00]");
    let value = serde_json::to_value(menu)?;
    assert_eq!(value["border_box"]["height"], 30.0);
    assert!(value["scrollbar"].is_null());

    let menu_id = laid_out
        .document
        .element_by_id("menu")
        .ok_or("menu id not registered")?;
    assert_eq!(laid_out.document.tag_name(menu_id)?, "div");
    assert!(laid_out.output.stats.single_pass());
    Ok(())
}

#[test]
fn test_unknown_element_is_rejected() -> TestResult {
    init_logs();
    let (mut small, _) = new_body("")?;
    let (mut large, body) = new_body("")?;
    let mut last = body;
    for _ in 0..4 {
        last = large.create_styled("div", "", Some(last))?;
    }

    let err = engine()
        .format_root(&mut small, last, Size::new(100.0, 100.0), None)
        .err()
        .ok_or("layout of a foreign element succeeded")?;
    assert!(matches!(err, LayoutError::UnknownElement(id) if id == last));
    Ok(())
}

#[test]
fn test_invalid_containing_block_is_rejected() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let engine = engine();

    let negative = engine.format_root(&mut doc, body, Size::new(-1.0, 100.0), None);
    assert!(matches!(negative, Err(LayoutError::InvalidContainingBlock(_, _))));
    let infinite = engine.format_root(&mut doc, body, Size::new(100.0, f32::INFINITY), None);
    assert!(matches!(infinite, Err(LayoutError::InvalidContainingBlock(_, _))));
    assert!(doc.layout(body)?.is_none());
    assert!(doc.layout_log().is_empty());
    Ok(())
}

#[test]
fn test_pool_ceiling_aborts_the_pass() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    doc.create_styled("div", "height: 10px", Some(body))?;
    let engine = LayoutEngine::new(LayoutConfig {
        max_pool_nodes: Some(3),
        ..Default::default()
    });

    let result = engine.format_root(&mut doc, body, Size::new(100.0, 100.0), None);

    assert!(matches!(result, Err(LayoutError::PoolExhausted { capacity: 3 })));
    Ok(())
}

#[test]
fn test_pool_slab_is_reused_between_passes() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    for _ in 0..50 {
        let p = doc.create_styled("p", "", Some(body))?;
        doc.create_text(p, "some wrapping words here")?;
    }
    let engine = LayoutEngine::new(LayoutConfig {
        pool_capacity: 4,
        ..Default::default()
    });

    let first = engine.format_root(&mut doc, body, Size::new(60.0, 100.0), None)?;
    let grown = engine.pool().grow_events();
    let second = engine.format_root(&mut doc, body, Size::new(60.0, 100.0), None)?;

    assert!(grown > 0);
    assert_eq!(engine.pool().grow_events(), grown);
    assert_eq!(engine.pool().checkouts(), 2);
    assert_eq!(engine.pool().idle_slabs(), 1);
    assert_eq!(first.stats.nodes_acquired, second.stats.nodes_acquired);
    assert_eq!(first.visible_overflow, second.visible_overflow);
    Ok(())
}

#[test]
fn test_json_document_matches_hand_built_one() -> TestResult {
    init_logs();
    let (mut from_json, root) = Document::from_json(MENU)?;
    engine().format_root(&mut from_json, root, Size::new(400.0, 300.0), None)?;

    let (mut by_hand, body) = new_body("width: 200px")?;
    let menu = by_hand.create_styled("div", "height: 30px", Some(body))?;
    by_hand.set_id_attr(menu, "menu")?;
    let p = by_hand.create_styled("p", "", Some(body))?;
    by_hand.create_text(p, "hello")?;
    engine().format_root(&mut by_hand, body, Size::new(400.0, 300.0), None)?;

    let boxes = |doc: &Document| -> Vec<_> {
        doc.ids()
            .filter_map(|id| doc.layout(id).ok().flatten().map(|l| l.box_model))
            .collect()
    };
    assert_eq!(boxes(&from_json), boxes(&by_hand));
    Ok(())
}

#[cfg(feature = "parallel")]
#[test]
fn test_format_roots_lays_out_documents_in_parallel() -> TestResult {
    init_logs();
    let mut jobs = Vec::new();
    for width in [50.0, 100.0, 150.0, 200.0] {
        let (doc, body) = new_body(&format!("width: {}px", width))?;
        jobs.push((doc, body));
    }
    for (doc, body) in jobs.iter_mut() {
        let p = doc.create_styled("p", "", Some(*body))?;
        doc.create_text(p, "aaaa bbbb cccc dddd")?;
    }

    let results = engine().format_roots(&mut jobs, Size::new(400.0, 400.0));

    assert_eq!(results.len(), 4);
    for result in results {
        assert!(result?.stats.single_pass());
    }
    let heights: Vec<f32> = jobs
        .iter()
        .map(|(doc, body)| common::size_of(doc, *body).height)
        .collect();
    assert_eq!(heights, vec![24.0, 12.0, 12.0, 12.0]);
    Ok(())
}
