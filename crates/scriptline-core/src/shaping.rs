//! Glyph attributes for engines without a shaper of their own.

use icu_properties::props::Script;
use scriptline_unicode::props::{self, Joining};

use crate::fixed::Fixed;
use crate::glyph::{GlyphLayoutMut, JustificationClass};

fn is_hidden(ch: char) -> bool {
    ch == props::SOFT_HYPHEN || props::is_control(ch)
}

/// Derives cluster, mark, visibility and justification attributes from the
/// characters of a run that was mapped with at most one glyph per
/// character.
///
/// Nonspacing marks become zero-advance marks and their log cluster is
/// moved onto the preceding cluster start. Arabic-script runs get the
/// Arabic kashida classes on top of the generic space/character classes.
pub fn heuristic_set_glyph_attributes(
    text: &[char],
    glyphs: &mut GlyphLayoutMut<'_>,
    log_clusters: &mut [usize],
    script: Script,
) {
    let length = text.len();
    if length == 0 || glyphs.is_empty() {
        return;
    }

    glyphs.attributes[0].mark = false;
    glyphs.attributes[0].cluster_start = true;
    glyphs.attributes[0].dont_print = is_hidden(text[0]);

    let mut pos = 0usize;
    let mut cluster_start = 0usize;
    let mut last_was_space = props::is_space_separator(text[0]);
    for i in 1..length {
        if log_clusters[i] == pos {
            // same glyph
            continue;
        }
        pos += 1;
        while pos < log_clusters[i] {
            glyphs.attributes[pos] = glyphs.attributes[pos - 1];
            pos += 1;
        }
        if pos >= glyphs.len() {
            break;
        }

        let ch = text[i];
        if is_hidden(ch) {
            glyphs.attributes[pos].dont_print = true;
        }
        let is_mark = props::is_nonspacing_mark(ch);
        if is_mark {
            glyphs.attributes[pos].mark = true;
            glyphs.attributes[pos].cluster_start = false;
            log_clusters[i] = cluster_start;
            glyphs.advances_x[pos] = Fixed::ZERO;
            glyphs.advances_y[pos] = Fixed::ZERO;
        } else {
            glyphs.attributes[pos].mark = false;
            glyphs.attributes[pos].cluster_start = true;
            cluster_start = log_clusters[i];
        }

        // the previous glyph is an inter-character point unless this one is a mark
        glyphs.attributes[pos - 1].justification = if last_was_space {
            JustificationClass::Space
        } else if !is_mark {
            JustificationClass::Character
        } else {
            JustificationClass::None
        };

        last_was_space = props::is_space_separator(ch);
    }

    let last = log_clusters[length - 1].min(glyphs.len() - 1);
    glyphs.attributes[last].justification = if last_was_space {
        JustificationClass::Space
    } else {
        JustificationClass::Character
    };

    if script == Script::Arabic {
        set_arabic_justification(text, glyphs, log_clusters);
    }
}

/// Kashida insertion class of an Arabic character.
pub fn arabic_justification_class(ch: char) -> JustificationClass {
    match ch {
        '\u{0627}' | '\u{0622}' | '\u{0623}' | '\u{0625}' => JustificationClass::Alef,
        '\u{0628}' | '\u{0631}' => JustificationClass::BaRa,
        '\u{0648}' => JustificationClass::Waw,
        '\u{062c}'..='\u{0630}' => JustificationClass::HaaDal,
        '\u{0633}'..='\u{0636}' => JustificationClass::Seen,
        props::KASHIDA => JustificationClass::Kashida,
        _ if props::is_space_separator(ch) => JustificationClass::ArabicSpace,
        _ => match props::joining(ch) {
            Joining::Dual | Joining::Right | Joining::Left => JustificationClass::ArabicNormal,
            _ => JustificationClass::None,
        },
    }
}

fn set_arabic_justification(text: &[char], glyphs: &mut GlyphLayoutMut<'_>, log_clusters: &[usize]) {
    for (i, &ch) in text.iter().enumerate() {
        let glyph = log_clusters[i];
        if glyph >= glyphs.len() || glyphs.attributes[glyph].mark {
            continue;
        }
        let class = arabic_justification_class(ch);
        if class != JustificationClass::None {
            glyphs.attributes[glyph].justification = class;
        }
    }
}
