//! Itemize command: the script items of a text, shaped.

use std::fmt;

use scriptline::prelude::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ItemRow {
    pub position: usize,
    pub length: usize,
    pub text: String,
    pub script: String,
    pub level: u8,
    pub flags: String,
    pub glyphs: usize,
    pub width: f32,
}

#[derive(Debug, Serialize)]
pub struct ItemizeReport {
    pub has_bidi: bool,
    pub right_to_left: bool,
    pub items: Vec<ItemRow>,
}

pub fn run(mut engine: TextEngine) -> ItemizeReport {
    let count = engine.item_count();
    let chars = engine.layout_string().to_vec();
    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        engine.shape(i);
        let length = engine.item_length(i);
        let si = engine.layout_data().items[i];
        items.push(ItemRow {
            position: si.position,
            length,
            text: chars[si.position..si.position + length].iter().collect(),
            script: format!("{:?}", si.analysis.script),
            level: si.analysis.bidi_level,
            flags: format!("{:?}", si.analysis.flags),
            glyphs: si.num_glyphs,
            width: si.width.to_f32(),
        });
    }
    ItemizeReport {
        has_bidi: engine.has_bidi(),
        right_to_left: engine.is_right_to_left(),
        items,
    }
}

impl fmt::Display for ItemizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} items, {}{}",
            self.items.len(),
            if self.right_to_left { "rtl" } else { "ltr" },
            if self.has_bidi { ", bidi" } else { "" }
        )?;
        for item in &self.items {
            writeln!(
                f,
                "{:>5} +{:<4} level {} {:<10} {:<9} {:>3} glyphs {:>8}  {:?}",
                item.position, item.length, item.level, item.script, item.flags, item.glyphs, item.width, item.text
            )?;
        }
        Ok(())
    }
}
