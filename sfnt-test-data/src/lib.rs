//! Synthetic SFNT fonts assembled in memory for tests.
//!
//! Every builder produces structurally valid table bytes; the canned
//! fonts at the bottom cover the common shapes the engine tests need:
//! a unit square glyph, composites, kerning and hinted variants.

/// Assembles a font from raw table payloads, generating the directory.
pub fn build_font(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0x00010000u32.to_be_bytes());
    data.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    data.extend_from_slice(&[0; 6]);
    let mut offset = 12 + 16 * tables.len() as u32;
    for (tag, payload) in tables {
        data.extend_from_slice(*tag);
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&offset.to_be_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        offset += payload.len() as u32;
    }
    for (_, payload) in tables {
        data.extend_from_slice(payload);
    }
    data
}

/// A `head` table with long loca offsets.
pub fn head(units_per_em: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0x00010000u32.to_be_bytes());
    data.extend_from_slice(&[0; 8]); // revision, checksum adjustment
    data.extend_from_slice(&0x5F0F3CF5u32.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes()); // flags
    data.extend_from_slice(&units_per_em.to_be_bytes());
    data.extend_from_slice(&[0; 16]); // timestamps
    for v in [0i16, -200, 1000, 1000] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data.extend_from_slice(&0u16.to_be_bytes()); // mac style
    data.extend_from_slice(&8u16.to_be_bytes()); // lowest rec ppem
    data.extend_from_slice(&2i16.to_be_bytes()); // direction hint
    data.extend_from_slice(&1i16.to_be_bytes()); // long loca
    data.extend_from_slice(&0i16.to_be_bytes());
    data
}

pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0x00010000u32.to_be_bytes());
    data.extend_from_slice(&num_glyphs.to_be_bytes());
    // max points, contours, composite points/contours, zones,
    // twilight, storage, fdefs, idefs, stack, instruction bytes,
    // components, depth
    for v in [64u16, 8, 128, 8, 2, 16, 64, 32, 8, 256, 200, 4, 2] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data
}

pub fn hhea(ascender: i16, descender: i16, line_gap: i16, num_long: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0x00010000u32.to_be_bytes());
    data.extend_from_slice(&ascender.to_be_bytes());
    data.extend_from_slice(&descender.to_be_bytes());
    data.extend_from_slice(&line_gap.to_be_bytes());
    data.extend_from_slice(&1000u16.to_be_bytes());
    data.extend_from_slice(&[0; 22]);
    data.extend_from_slice(&num_long.to_be_bytes());
    data
}

pub fn hmtx(metrics: &[(u16, i16)]) -> Vec<u8> {
    let mut data = Vec::new();
    for (advance, bearing) in metrics {
        data.extend_from_slice(&advance.to_be_bytes());
        data.extend_from_slice(&bearing.to_be_bytes());
    }
    data
}

pub fn os2(fs_selection: u16, x_height: i16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&2u16.to_be_bytes()); // version
    data.extend_from_slice(&500i16.to_be_bytes());
    data.extend_from_slice(&400u16.to_be_bytes());
    data.extend_from_slice(&5u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&[0; 16]);
    data.extend_from_slice(&50i16.to_be_bytes()); // strikeout size
    data.extend_from_slice(&250i16.to_be_bytes()); // strikeout position
    data.extend_from_slice(&0i16.to_be_bytes());
    data.extend_from_slice(&[0; 30]);
    data.extend_from_slice(&fs_selection.to_be_bytes());
    data.extend_from_slice(&0x20u16.to_be_bytes());
    data.extend_from_slice(&0xFFu16.to_be_bytes());
    data.extend_from_slice(&800i16.to_be_bytes()); // typo ascender
    data.extend_from_slice(&(-200i16).to_be_bytes()); // typo descender
    data.extend_from_slice(&90i16.to_be_bytes()); // typo line gap
    data.extend_from_slice(&820u16.to_be_bytes()); // win ascent
    data.extend_from_slice(&210u16.to_be_bytes()); // win descent
    data.extend_from_slice(&[0; 8]);
    data.extend_from_slice(&x_height.to_be_bytes());
    data.extend_from_slice(&700i16.to_be_bytes());
    data
}

/// A format 4 `cmap` with one single-codepoint segment per mapping,
/// wrapped as a Microsoft BMP subtable.
pub fn cmap(mappings: &[(u32, u16)]) -> Vec<u8> {
    let mut segments: Vec<(u16, u16, i16)> = mappings
        .iter()
        .map(|(code, glyph)| {
            let code = *code as u16;
            (code, code, (*glyph as i32 - code as i32) as i16)
        })
        .collect();
    segments.sort();
    segments.push((0xFFFF, 0xFFFF, 1));
    let seg_count = segments.len() as u16;
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&3u16.to_be_bytes());
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&12u32.to_be_bytes());
    let length = 16 + 8 * seg_count;
    data.extend_from_slice(&4u16.to_be_bytes());
    data.extend_from_slice(&length.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&(seg_count * 2).to_be_bytes());
    data.extend_from_slice(&[0; 6]);
    for (_, end, _) in &segments {
        data.extend_from_slice(&end.to_be_bytes());
    }
    data.extend_from_slice(&0u16.to_be_bytes());
    for (start, _, _) in &segments {
        data.extend_from_slice(&start.to_be_bytes());
    }
    for (_, _, delta) in &segments {
        data.extend_from_slice(&delta.to_be_bytes());
    }
    for _ in &segments {
        data.extend_from_slice(&0u16.to_be_bytes());
    }
    data
}

/// A simple glyph with long-form coordinates and explicit bounds.
pub fn simple_glyph(contours: &[&[(i16, i16, bool)]], instructions: &[u8]) -> Vec<u8> {
    let points: Vec<(i16, i16)> = contours
        .iter()
        .flat_map(|c| c.iter().map(|(x, y, _)| (*x, *y)))
        .collect();
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(0);
    let y_max = points.iter().map(|p| p.1).max().unwrap_or(0);
    let mut data = Vec::new();
    data.extend_from_slice(&(contours.len() as i16).to_be_bytes());
    for v in [x_min, y_min, x_max, y_max] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    let mut end = -1i32;
    for contour in contours {
        end += contour.len() as i32;
        data.extend_from_slice(&(end as u16).to_be_bytes());
    }
    data.extend_from_slice(&(instructions.len() as u16).to_be_bytes());
    data.extend_from_slice(instructions);
    for contour in contours {
        for (_, _, on_curve) in *contour {
            data.push(if *on_curve { 0x01 } else { 0x00 });
        }
    }
    let mut prev = 0i16;
    for (x, _) in &points {
        data.extend_from_slice(&(x - prev).to_be_bytes());
        prev = *x;
    }
    prev = 0;
    for (_, y) in &points {
        data.extend_from_slice(&(y - prev).to_be_bytes());
        prev = *y;
    }
    data
}

/// One composite component record.
pub struct ComponentRecord {
    pub flags: u16,
    pub glyph_id: u16,
    pub arg1: i16,
    pub arg2: i16,
    /// Raw 2.14 transform words appended after the args.
    pub transform: Vec<i16>,
}

/// A composite glyph from explicit component records; the MORE flag is
/// managed here.
pub fn composite_glyph(components: &[ComponentRecord], bounds_y_max: i16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(-1i16).to_be_bytes());
    for v in [0, 0, 0, bounds_y_max] {
        data.extend_from_slice(&(v as i16).to_be_bytes());
    }
    for (index, component) in components.iter().enumerate() {
        let mut flags = component.flags | 0x0001; // word args
        if index + 1 < components.len() {
            flags |= 0x0020;
        }
        data.extend_from_slice(&flags.to_be_bytes());
        data.extend_from_slice(&component.glyph_id.to_be_bytes());
        data.extend_from_slice(&component.arg1.to_be_bytes());
        data.extend_from_slice(&component.arg2.to_be_bytes());
        for word in &component.transform {
            data.extend_from_slice(&word.to_be_bytes());
        }
    }
    data
}

/// Long-format `loca` and concatenated `glyf` payloads.
pub fn glyf_and_loca(glyphs: &[Vec<u8>]) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = Vec::new();
    let mut loca = Vec::new();
    loca.extend_from_slice(&0u32.to_be_bytes());
    for glyph in glyphs {
        glyf.extend_from_slice(glyph);
        loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
    }
    (glyf, loca)
}

/// A `kern` table of format 0 subtables given as (coverage, pairs).
pub fn kern(subtables: &[(u16, &[(u16, u16, i16)])]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&(subtables.len() as u16).to_be_bytes());
    for (coverage, pairs) in subtables {
        let length = 14 + 6 * pairs.len() as u16;
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&length.to_be_bytes());
        data.extend_from_slice(&coverage.to_be_bytes());
        data.extend_from_slice(&(pairs.len() as u16).to_be_bytes());
        data.extend_from_slice(&[0; 6]);
        for (left, right, value) in *pairs {
            data.extend_from_slice(&left.to_be_bytes());
            data.extend_from_slice(&right.to_be_bytes());
            data.extend_from_slice(&value.to_be_bytes());
        }
    }
    data
}

/// Two glyphs: 0 empty, 1 a 1000 unit square mapped from 'A', with
/// units per em 1000 and advance 1000.
pub fn minimal_font() -> Vec<u8> {
    minimal_font_with_programs(&[], &[], &[], &[])
}

/// The minimal font plus hinting tables: per-glyph instructions on the
/// square, `fpgm`, `prep` and `cvt ` payloads.
pub fn minimal_font_with_programs(
    instructions: &[u8],
    fpgm: &[u8],
    prep: &[u8],
    cvt: &[i16],
) -> Vec<u8> {
    let square = simple_glyph(
        &[&[
            (0, 0, true),
            (1000, 0, true),
            (1000, 1000, true),
            (0, 1000, true),
        ]],
        instructions,
    );
    let (glyf, loca) = glyf_and_loca(&[Vec::new(), square]);
    let mut cvt_bytes = Vec::new();
    for value in cvt {
        cvt_bytes.extend_from_slice(&value.to_be_bytes());
    }
    let mut tables: Vec<(&[u8; 4], Vec<u8>)> = vec![
        (b"head", head(1000)),
        (b"maxp", maxp(2)),
        (b"hhea", hhea(800, -200, 90, 2)),
        (b"hmtx", hmtx(&[(500, 0), (1000, 0)])),
        (b"OS/2", os2(0x40, 500)),
        (b"cmap", cmap(&[('A' as u32, 1)])),
        (b"loca", loca),
        (b"glyf", glyf),
    ];
    if !fpgm.is_empty() {
        tables.push((b"fpgm", fpgm.to_vec()));
    }
    if !prep.is_empty() {
        tables.push((b"prep", prep.to_vec()));
    }
    if !cvt_bytes.is_empty() {
        tables.push((b"cvt ", cvt_bytes));
    }
    build_font(&tables)
}

/// Four glyphs: 0 empty, 1 a triangle child, 2 a composite of two
/// child copies (literal offset then point anchor), 3 a half-scale
/// child with a scaled component offset. Mapped from 'A', 'B', 'C'.
pub fn composite_font() -> Vec<u8> {
    let child = simple_glyph(&[&[(0, 0, true), (100, 0, true), (50, 80, true)]], &[]);
    let two_children = composite_glyph(
        &[
            ComponentRecord {
                flags: 0x0002, // literal offset
                glyph_id: 1,
                arg1: 100,
                arg2: 0,
                transform: Vec::new(),
            },
            ComponentRecord {
                flags: 0, // point anchor: parent 1, child 0
                glyph_id: 1,
                arg1: 1,
                arg2: 0,
                transform: Vec::new(),
            },
        ],
        80,
    );
    let half_scale = composite_glyph(
        &[ComponentRecord {
            flags: 0x0002 | 0x0008 | 0x0800, // offset, scale, scaled offset
            glyph_id: 1,
            arg1: 100,
            arg2: 0,
            transform: vec![0x2000], // 0.5 in 2.14
        }],
        40,
    );
    let (glyf, loca) = glyf_and_loca(&[Vec::new(), child, two_children, half_scale]);
    build_font(&[
        (b"head", head(1000)),
        (b"maxp", maxp(4)),
        (b"hhea", hhea(800, -200, 90, 4)),
        (b"hmtx", hmtx(&[(500, 0), (200, 0), (400, 0), (300, 0)])),
        (b"OS/2", os2(0x40, 500)),
        (
            b"cmap",
            cmap(&[('A' as u32, 1), ('B' as u32, 2), ('C' as u32, 3)]),
        ),
        (b"loca", loca),
        (b"glyf", glyf),
    ])
}

/// The minimal font plus a kern table adjusting the pair ('A', 'A').
pub fn kerned_font(adjustment: i16) -> Vec<u8> {
    let square = simple_glyph(
        &[&[
            (0, 0, true),
            (1000, 0, true),
            (1000, 1000, true),
            (0, 1000, true),
        ]],
        &[],
    );
    let (glyf, loca) = glyf_and_loca(&[Vec::new(), square]);
    build_font(&[
        (b"head", head(1000)),
        (b"maxp", maxp(2)),
        (b"hhea", hhea(800, -200, 90, 2)),
        (b"hmtx", hmtx(&[(500, 0), (1000, 0)])),
        (b"OS/2", os2(0x40, 500)),
        (b"cmap", cmap(&[('A' as u32, 1)])),
        (b"loca", loca),
        (b"glyf", glyf),
        (b"kern", kern(&[(0x01, &[(1, 1, adjustment)])])),
    ])
}

/// A font whose only real glyph is a self-referencing composite.
pub fn cyclic_composite_font() -> Vec<u8> {
    let cyclic = composite_glyph(
        &[ComponentRecord {
            flags: 0x0002,
            glyph_id: 1,
            arg1: 0,
            arg2: 0,
            transform: Vec::new(),
        }],
        0,
    );
    let (glyf, loca) = glyf_and_loca(&[Vec::new(), cyclic]);
    build_font(&[
        (b"head", head(1000)),
        (b"maxp", maxp(2)),
        (b"hhea", hhea(800, -200, 90, 2)),
        (b"hmtx", hmtx(&[(500, 0), (1000, 0)])),
        (b"OS/2", os2(0x40, 500)),
        (b"cmap", cmap(&[('A' as u32, 1)])),
        (b"loca", loca),
        (b"glyf", glyf),
    ])
}
