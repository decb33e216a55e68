//! End-to-end rendering through the public API: load a synthetic font,
//! fetch glyphs at a size, rasterize and measure text.

use graver::{Font, LayoutFlags, LayoutOptions, Rasterizer, Size};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn load_scale_rasterize() {
    init_logging();
    let mut font = Font::from_vec(sfnt_test_data::minimal_font()).unwrap();
    font.set_size(Size::new(16));
    // 16pt at the default 96 dpi is a 24 pixel em; the glyph is a full
    // em square with a 1000 unit advance at 1000 units per em.
    assert_eq!(font.pixel_size(), 24.0);
    let slot = font.glyph('A').unwrap().clone();
    assert_eq!(slot.points.len(), 8); // four corners plus four phantoms
    assert_eq!((slot.width, slot.height), (24, 24));
    assert_eq!(slot.advance, 24.0);

    let mut rasterizer = Rasterizer::new();
    let spans = slot.rasterize(&mut rasterizer);
    assert!(!spans.is_empty());
    let covered: f32 = spans
        .iter()
        .map(|span| span.len() as f32 * span.alpha as f32 / 255.0)
        .sum();
    assert_eq!(covered, 576.0);
    // Every span stays inside the slot's pixel cell.
    for span in spans {
        assert!(span.x >= 0 && span.end <= 24);
        assert!((0..24).contains(&span.y));
    }
}

#[test]
fn measure_text_with_kerning() {
    init_logging();
    let mut font = Font::from_vec(sfnt_test_data::kerned_font(-100)).unwrap();
    font.set_size(Size::new(16));
    let options = LayoutOptions {
        flags: LayoutFlags::LINE_WRAP,
        kerning: true,
        ..Default::default()
    };
    let metrics = font.measure("AA\nA", &options).unwrap();
    assert_eq!(metrics.lines.len(), 2);
    // Two 24 pixel advances minus the 2 pixel kern between them.
    assert_eq!(metrics.lines[0].width, 46.0);
    assert_eq!(metrics.lines[1].width, 24.0);
    assert_eq!(metrics.height, metrics.lines[0].height * 2.0);
    assert_eq!(metrics.glyph_count, 4);
}

#[test]
fn hinted_font_changes_nothing_without_instructions() {
    init_logging();
    // The square carries no hint program, so hinting on and off agree.
    let mut hinted = Font::from_vec(sfnt_test_data::minimal_font()).unwrap();
    hinted.set_size(Size::new(16));
    let mut unhinted = Font::from_vec(sfnt_test_data::minimal_font()).unwrap();
    unhinted.set_size(Size::new(16));
    unhinted.set_hinting(false);
    let a = hinted.glyph('A').unwrap().clone();
    let b = unhinted.glyph('A').unwrap().clone();
    assert_eq!(a.points, b.points);
    assert_eq!(a.advance, b.advance);
}
