mod common;

use boxflow::{LaidOutDocument, Size, Vec2};
use common::{TestResult, content_width, init_logs, layout, new_body, pos, size_of};

#[test]
fn test_two_stacked_children_in_fixed_width_container() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let container = doc.create_styled("div", "width: 300px", Some(body))?;
    let first = doc.create_styled("div", "height: 50px", Some(container))?;
    let second = doc.create_styled("div", "height: 70px", Some(container))?;

    let output = layout(&mut doc, body, 400.0, 400.0)?;

    assert_eq!(pos(&doc, first), Vec2::new(0.0, 0.0));
    assert_eq!(pos(&doc, second), Vec2::new(0.0, 50.0));
    assert_eq!(size_of(&doc, first), Size::new(300.0, 50.0));
    assert_eq!(size_of(&doc, container), Size::new(300.0, 120.0));
    assert!(output.stats.single_pass());
    assert_eq!(output.stats.max_root_attempts, 1);
    assert_eq!(doc.layout_log(), &[first, second, container, body]);
    Ok(())
}

#[test]
fn test_display_none_contributes_nothing() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let visible = doc.create_styled("div", "height: 20px", Some(body))?;
    let hidden = doc.create_styled("div", "display: none; width: 900px; height: 500px", Some(body))?;
    let inside = doc.create_styled("div", "height: 10px", Some(hidden))?;

    let output = layout(&mut doc, body, 400.0, 400.0)?;

    assert!(doc.layout(hidden)?.is_none());
    assert!(doc.layout(inside)?.is_none());
    assert!(!doc.layout_log().contains(&hidden));
    assert!(!doc.layout_log().contains(&inside));
    assert_eq!(doc.layout_log(), &[visible, body]);
    assert_eq!(output.visible_overflow, Size::new(400.0, 20.0));
    Ok(())
}

#[test]
fn test_percent_width_with_padding_and_border() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let container = doc.create_styled("div", "width: 50%; padding: 10px; border-width: 2px", Some(body))?;
    let child = doc.create_styled("div", "height: 8px", Some(container))?;

    layout(&mut doc, body, 400.0, 400.0)?;

    assert_eq!(size_of(&doc, container), Size::new(224.0, 32.0));
    assert_eq!(content_width(&doc, child), 200.0);
    assert_eq!(pos(&doc, child), Vec2::new(12.0, 12.0));
    let child_layout = doc.layout(child)?.copied().ok_or("child has no layout")?;
    assert_eq!(child_layout.offset_parent, Some(container));
    assert_eq!(child_layout.offset, Vec2::new(12.0, 12.0));
    Ok(())
}

#[test]
fn test_border_box_sizing() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let boxed = doc.create_styled(
        "div",
        "width: 100px; height: 40px; padding: 10px; box-sizing: border-box",
        Some(body),
    )?;

    layout(&mut doc, body, 400.0, 400.0)?;

    assert_eq!(size_of(&doc, boxed), Size::new(100.0, 40.0));
    assert_eq!(content_width(&doc, boxed), 80.0);
    Ok(())
}

#[test]
fn test_auto_margins_center_fixed_width_block() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let centered = doc.create_styled("div", "width: 100px; height: 10px; margin: 0 auto", Some(body))?;

    layout(&mut doc, body, 400.0, 400.0)?;

    assert_eq!(pos(&doc, centered), Vec2::new(150.0, 0.0));
    Ok(())
}

#[test]
fn test_min_and_max_constraints() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let short = doc.create_styled("div", "height: 10px; min-height: 30px", Some(body))?;
    let narrow = doc.create_styled("div", "max-width: 120px; height: 5px", Some(body))?;
    let capped = doc.create_styled("div", "max-height: 15px", Some(body))?;
    doc.create_styled("div", "height: 40px", Some(capped))?;

    layout(&mut doc, body, 400.0, 400.0)?;

    assert_eq!(size_of(&doc, short), Size::new(400.0, 30.0));
    assert_eq!(size_of(&doc, narrow), Size::new(120.0, 5.0));
    assert_eq!(size_of(&doc, capped).height, 15.0);
    Ok(())
}

#[test]
fn test_sibling_margins_collapse() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    doc.create_styled("div", "height: 50px; margin-bottom: 20px", Some(body))?;
    let second = doc.create_styled("div", "height: 10px; margin-top: 30px; margin-bottom: 5px", Some(body))?;

    layout(&mut doc, body, 400.0, 400.0)?;

    assert_eq!(pos(&doc, second), Vec2::new(0.0, 80.0));
    assert_eq!(size_of(&doc, body).height, 95.0);
    Ok(())
}

#[test]
fn test_visible_overflow_respects_clipping() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    doc.create_styled("div", "width: 600px; height: 10px", Some(body))?;
    let output = layout(&mut doc, body, 400.0, 400.0)?;
    assert_eq!(output.visible_overflow, Size::new(600.0, 10.0));

    doc.set_style(body, "font-size: 10px; overflow: hidden")?;
    let output = layout(&mut doc, body, 400.0, 400.0)?;
    assert_eq!(output.visible_overflow, Size::new(400.0, 10.0));
    Ok(())
}

#[test]
fn test_text_wraps_inside_block() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let paragraph = doc.create_styled("p", "width: 100px; padding: 4px", Some(body))?;
    let text = doc.create_text(paragraph, "aaaa aaaa aaaa aaaa aaaa")?;

    let output = layout(&mut doc, body, 400.0, 400.0)?;

    assert_eq!(pos(&doc, text), Vec2::new(4.0, 4.0));
    assert_eq!(size_of(&doc, text), Size::new(95.0, 24.0));
    assert_eq!(size_of(&doc, paragraph), Size::new(108.0, 32.0));
    assert!(output.stats.single_pass());
    Ok(())
}

#[test]
fn test_layout_is_repeatable() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let container = doc.create_styled("div", "width: 120px; padding: 3px", Some(body))?;
    let text = doc.create_text(container, "one two three four five six")?;

    layout(&mut doc, body, 400.0, 400.0)?;
    let first = (pos(&doc, text), size_of(&doc, text), size_of(&doc, container));
    layout(&mut doc, body, 400.0, 400.0)?;
    let second = (pos(&doc, text), size_of(&doc, text), size_of(&doc, container));

    assert_eq!(first, second);
    assert_eq!(doc.get(container)?.layout_count(), 2);
    Ok(())
}

#[test]
fn test_hidden_after_layout_leaves_no_geometry() -> TestResult {
    init_logs();
    let (mut doc, body) = new_body("")?;
    let panel = doc.create_styled("div", "height: 50px", Some(body))?;
    let label = doc.create_text(panel, "label")?;
    let footer = doc.create_styled("div", "height: 10px", Some(body))?;

    layout(&mut doc, body, 400.0, 400.0)?;
    assert_eq!(pos(&doc, footer), Vec2::new(0.0, 50.0));

    doc.set_style(panel, "display: none; height: 50px")?;
    let output = layout(&mut doc, body, 400.0, 400.0)?;

    assert!(doc.layout(panel)?.is_none());
    assert!(doc.layout(label)?.is_none());
    assert_eq!(pos(&doc, footer), Vec2::new(0.0, 0.0));
    assert_eq!(doc.layout_log(), &[footer, body]);

    let laid_out = LaidOutDocument {
        document: doc,
        root: body,
        output,
    };
    let addresses: Vec<String> = laid_out.geometry().into_iter().map(|g| g.address).collect();
    assert_eq!(addresses, vec!["body".to_string(), "div < body".to_string()]);
    Ok(())
}
