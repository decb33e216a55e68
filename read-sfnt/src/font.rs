//! The fully parsed font file.

use std::io::{Read, Seek};

use crate::directory::TableDirectory;
use crate::stream::FontStream;
use crate::tables::{
    cmap::{self, CharacterMap},
    glyf::{self, GlyphTable},
    head::{self, Head},
    hhea::{self, MetricsHeader},
    hmtx::{self, MetricsTable},
    kern::{self, KerningTable},
    loca::Loca,
    maxp::{self, Maxp},
    name::{self, NameTable},
    os2::{self, Os2},
    post::{self, Post},
    programs::{self, ControlValues},
};
use crate::{ReadError, TableRecord};

/// An SFNT font decoded into owned tables.
///
/// Everything is read eagerly during [`FontFile::read`]; afterwards the
/// value is immutable and safe to share between threads.
#[derive(Debug)]
pub struct FontFile {
    pub head: Head,
    pub maxp: Maxp,
    pub hhea: MetricsHeader,
    pub hmtx: MetricsTable,
    pub vhea: Option<MetricsHeader>,
    pub vmtx: Option<MetricsTable>,
    pub os2: Os2,
    pub post: Option<Post>,
    pub cmap: CharacterMap,
    pub kern: Option<KerningTable>,
    pub name: Option<NameTable>,
    /// Absent in metrics-only fonts.
    pub glyf: Option<GlyphTable>,
    pub cvt: ControlValues,
    pub fpgm: Vec<u8>,
    pub prep: Vec<u8>,
}

impl FontFile {
    /// Parses a font from a seekable byte source.
    pub fn read<R: Read + Seek>(source: R) -> Result<Self, ReadError> {
        let mut stream = FontStream::new(source);
        let directory = TableDirectory::read(&mut stream)?;
        let seek_to = |stream: &mut FontStream<R>, record: &TableRecord| {
            stream.seek(record.offset as u64)
        };

        let record = *directory.require(head::TAG)?;
        seek_to(&mut stream, &record)?;
        let head = Head::read(&mut stream)?;

        let record = *directory.require(maxp::TAG)?;
        seek_to(&mut stream, &record)?;
        let maxp = Maxp::read(&mut stream)?;

        let record = *directory.require(hhea::TAG)?;
        seek_to(&mut stream, &record)?;
        let hhea = MetricsHeader::read(&mut stream, maxp.num_glyphs)?;

        let record = *directory.require(hmtx::TAG)?;
        seek_to(&mut stream, &record)?;
        let hmtx = MetricsTable::read(&mut stream, hhea.number_of_long_metrics, maxp.num_glyphs)?;

        let mut vhea = None;
        let mut vmtx = None;
        if let Some(record) = directory.get(hhea::VERTICAL_TAG).copied() {
            seek_to(&mut stream, &record)?;
            let header = MetricsHeader::read(&mut stream, maxp.num_glyphs)?;
            if let Some(record) = directory.get(hmtx::VERTICAL_TAG).copied() {
                seek_to(&mut stream, &record)?;
                vmtx = Some(MetricsTable::read(
                    &mut stream,
                    header.number_of_long_metrics,
                    maxp.num_glyphs,
                )?);
            }
            vhea = Some(header);
        }

        let record = *directory.require(os2::TAG)?;
        seek_to(&mut stream, &record)?;
        let os2 = Os2::read(&mut stream)?;

        let mut post = None;
        if let Some(record) = directory.get(post::TAG).copied() {
            seek_to(&mut stream, &record)?;
            post = Some(Post::read(&mut stream)?);
        }

        let record = *directory.require(cmap::TAG)?;
        seek_to(&mut stream, &record)?;
        let cmap = CharacterMap::read(&mut stream, record.offset, record.length)?;

        let mut kern = None;
        if let Some(record) = directory.get(kern::TAG).copied() {
            seek_to(&mut stream, &record)?;
            kern = Some(KerningTable::read(&mut stream, record.offset)?);
        }

        let mut name = None;
        if let Some(record) = directory.get(name::TAG).copied() {
            seek_to(&mut stream, &record)?;
            name = Some(NameTable::read(&mut stream, record.offset)?);
        }

        // Outline data is optional as a pair; loca without glyf (or the
        // reverse) is treated as absent outlines.
        let mut glyf = None;
        if let (Some(loca_record), Some(glyf_record)) = (
            directory.get(crate::tables::loca::TAG).copied(),
            directory.get(glyf::TAG).copied(),
        ) {
            seek_to(&mut stream, &loca_record)?;
            let loca = Loca::read(&mut stream, maxp.num_glyphs, head.index_to_loc_format)?;
            glyf = Some(GlyphTable::read(
                &mut stream,
                glyf_record.offset,
                &loca,
                maxp.num_glyphs,
            )?);
        }

        let mut cvt = ControlValues::default();
        if let Some(record) = directory.get(programs::CVT_TAG).copied() {
            seek_to(&mut stream, &record)?;
            cvt = ControlValues::read(&mut stream, record.length)?;
        }
        let mut fpgm = Vec::new();
        if let Some(record) = directory.get(programs::FPGM_TAG).copied() {
            seek_to(&mut stream, &record)?;
            fpgm = programs::read_bytecode(&mut stream, record.length)?;
        }
        let mut prep = Vec::new();
        if let Some(record) = directory.get(programs::PREP_TAG).copied() {
            seek_to(&mut stream, &record)?;
            prep = programs::read_bytecode(&mut stream, record.length)?;
        }

        Ok(Self {
            head,
            maxp,
            hhea,
            hmtx,
            vhea,
            vmtx,
            os2,
            post,
            cmap,
            kern,
            name,
            glyf,
            cvt,
            fpgm,
            prep,
        })
    }

    /// Parses a font held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<Self, ReadError> {
        Self::read(std::io::Cursor::new(data))
    }
}
