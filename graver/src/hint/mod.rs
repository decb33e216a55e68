//! The TrueType hinting virtual machine.
//!
//! [`HintInstance`] holds the per-size interpreter state: the scaled
//! control values, storage area, function definitions and the graphics
//! state snapshot produced by the control value program. One instance
//! serves one font at one scale; [`HintInstance::reconfigure`] rebuilds
//! it when the scale changes and [`HintInstance::hint`] runs a glyph
//! program over a scaled outline.

mod call_stack;
mod definition;
mod engine;
mod error;
mod graphics;
mod math;
mod opcodes;
mod program;
mod round;
mod value_stack;
mod zone;

pub use error::{HintError, HintErrorKind};
pub use program::Program;

use read_sfnt::FontFile;

use crate::outline::ScaledOutline;

use definition::DefinitionTable;
use engine::Engine;
use graphics::{GraphicsState, RetainedGraphicsState};
use value_stack::ValueStack;
use zone::Zone;

/// Headroom over the declared stack size; some fonts under-report.
const STACK_HEADROOM: usize = 32;

/// Interpreter state for one font at one scale.
#[derive(Default, Debug)]
pub struct HintInstance {
    fpgm: Vec<u8>,
    prep: Vec<u8>,
    unscaled_cvt: Vec<i32>,
    cvt: Vec<i32>,
    storage: Vec<i32>,
    functions: DefinitionTable,
    instruction_defs: DefinitionTable,
    graphics: RetainedGraphicsState,
    twilight: Zone,
    max_stack: usize,
    max_twilight: usize,
    max_function_defs: usize,
    max_instruction_defs: usize,
    max_storage: usize,
    valid: bool,
}

impl HintInstance {
    pub fn new(font: &FontFile) -> Self {
        Self {
            fpgm: font.fpgm.clone(),
            prep: font.prep.clone(),
            unscaled_cvt: font.cvt.values.iter().map(|v| *v as i32).collect(),
            max_stack: font.maxp.max_stack_elements as usize + STACK_HEADROOM,
            max_twilight: font.maxp.max_twilight_points as usize,
            max_function_defs: font.maxp.max_function_defs as usize,
            max_instruction_defs: font.maxp.max_instruction_defs as usize,
            max_storage: font.maxp.max_storage as usize,
            ..Default::default()
        }
    }

    /// Rebuilds the instance for a new scale: rescales the control
    /// values, then runs the font program and the control value
    /// program. `scale` converts font units to 26.6 pixels as a 16.16
    /// factor.
    pub fn reconfigure(&mut self, scale: i32, ppem: i32) -> Result<(), HintError> {
        self.valid = false;
        self.functions.reset(self.max_function_defs);
        self.instruction_defs.reset(self.max_instruction_defs);
        self.cvt.clear();
        self.cvt
            .extend(self.unscaled_cvt.iter().map(|v| math::mul(*v, scale)));
        self.storage.clear();
        self.storage.resize(self.max_storage, 0);
        self.graphics = RetainedGraphicsState::new(scale, ppem);
        let mut state = GraphicsState::new(
            self.graphics,
            Zone::twilight(self.max_twilight),
            Zone::default(),
        );
        let mut value_stack = ValueStack::new(self.max_stack);
        let fpgm = core::mem::take(&mut self.fpgm);
        let prep = core::mem::take(&mut self.prep);
        let result = {
            let mut engine = Engine::new(
                [&fpgm, &prep, &[]],
                &mut state,
                &mut value_stack,
                &mut self.functions,
                &mut self.instruction_defs,
                &mut self.cvt,
                &mut self.storage,
            );
            engine
                .run(Program::Font)
                .and_then(|_| engine.run(Program::ControlValue))
        };
        self.fpgm = fpgm;
        self.prep = prep;
        result?;
        // Bit 2 tells the rasterizer to drop the state the control
        // value program just set up.
        self.graphics = if state.retained.instruct_control & 2 != 0 {
            RetainedGraphicsState::new(scale, ppem)
        } else {
            state.retained
        };
        self.twilight = core::mem::take(&mut state.zones[0]);
        self.valid = true;
        Ok(())
    }

    /// True when glyph programs should run at all. The control value
    /// program can veto hinting via instruction control bit 0.
    pub fn is_enabled(&self) -> bool {
        self.valid && self.graphics.instruct_control & 1 == 0
    }

    /// Runs a glyph program over a scaled outline, adjusting its
    /// working points in place. The outline keeps its pre-hinting
    /// positions in `original`, so a caller can recover from a failed
    /// run by copying them back.
    pub fn hint(&mut self, outline: &mut ScaledOutline) -> Result<(), HintError> {
        if !self.is_enabled() || outline.instructions.is_empty() {
            return Ok(());
        }
        let glyph = Zone {
            unscaled: core::mem::take(&mut outline.unscaled),
            original: core::mem::take(&mut outline.original),
            points: core::mem::take(&mut outline.points),
            flags: core::mem::take(&mut outline.flags),
            contour_ends: core::mem::take(&mut outline.contour_ends),
        };
        let mut state = GraphicsState::new(self.graphics, self.twilight.clone(), glyph);
        state.is_composite = outline.is_composite;
        // Glyph programs may scribble on the control values and the
        // storage area; those writes must not leak into later glyphs.
        let mut cvt = self.cvt.clone();
        let mut storage = self.storage.clone();
        let mut value_stack = ValueStack::new(self.max_stack);
        let result = {
            let mut engine = Engine::new(
                [&self.fpgm, &self.prep, &outline.instructions],
                &mut state,
                &mut value_stack,
                &mut self.functions,
                &mut self.instruction_defs,
                &mut cvt,
                &mut storage,
            );
            engine.run(Program::Glyph)
        };
        let glyph = core::mem::take(&mut state.zones[1]);
        outline.unscaled = glyph.unscaled;
        outline.original = glyph.original;
        outline.points = glyph.points;
        outline.flags = glyph.flags;
        outline.contour_ends = glyph.contour_ends;
        result
    }
}
