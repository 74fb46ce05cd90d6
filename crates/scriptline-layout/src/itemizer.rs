//! Splitting analysed text into script items.
//!
//! [`analyze`] resolves one [`ScriptAnalysis`] per character (embedding
//! level, script and special-character flags). [`Itemizer`] then cuts the
//! text into maximal runs of equal analysis, with the capitalization mode
//! deciding the extra cuts and the case flags items carry.

use scriptline_core::{AnalysisFlags, ScriptAnalysis, ScriptItem};
use scriptline_unicode::props::{self, LINE_SEPARATOR, NBSP, OBJECT_REPLACEMENT};
use scriptline_unicode::{bidi_itemize, is_simple_ltr, Script, WordBoundaryFinder};

use crate::options::{Capitalization, TextOptionFlags};

/// Longest run a single item may cover.
pub const MAX_ITEM_LENGTH: usize = 4096;

/// Drawn in place of a line separator when separators are shown.
pub const VISIBLE_LINE_SEPARATOR: char = '\u{21b5}';

/// Per-character analysis of a paragraph.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub chars: Vec<ScriptAnalysis>,
    pub has_bidi: bool,
}

/// Resolves levels, scripts and flags for every character of `string`.
///
/// `rtl` is the paragraph direction, `forced_rtl` whether it was set
/// explicitly rather than detected. With separators shown, line separators
/// in `string` are replaced by [`VISIBLE_LINE_SEPARATOR`].
pub fn analyze(
    string: &mut [char],
    rtl: bool,
    forced_rtl: bool,
    ignore_bidi: bool,
    flags: &TextOptionFlags,
) -> Analysis {
    let length = string.len();
    let mut levels = vec![0u8; length];
    let mut has_bidi = false;

    let ignore = ignore_bidi || (!rtl && is_simple_ltr(string));
    if ignore {
        if forced_rtl {
            levels.fill(1);
            has_bidi = true;
        }
    } else {
        has_bidi = bidi_itemize(string, rtl, &mut levels);
    }
    let base_level = u8::from(rtl);

    let mut chars = Vec::with_capacity(length);
    let mut previous_script = Script::Common;
    for i in 0..length {
        let mut script = props::script(string[i]);
        if script == Script::Inherited {
            script = previous_script;
        }
        previous_script = script;

        let mut analysis = ScriptAnalysis {
            script,
            bidi_level: levels[i],
            flags: AnalysisFlags::None,
        };
        match string[i] {
            OBJECT_REPLACEMENT => {
                analysis.flags = AnalysisFlags::Object;
                analysis.script = Script::Common;
            },
            LINE_SEPARATOR => {
                if analysis.bidi_level % 2 == 1 {
                    analysis.bidi_level -= 1;
                }
                analysis.flags = AnalysisFlags::LineOrParagraphSeparator;
                analysis.script = Script::Common;
                if flags.show_line_and_paragraph_separators {
                    string[i] = VISIBLE_LINE_SEPARATOR;
                }
            },
            '\t' => {
                analysis.flags = AnalysisFlags::Tab;
                analysis.bidi_level = base_level;
            },
            ' ' | NBSP if flags.show_tabs_and_spaces => {
                analysis.flags = AnalysisFlags::Space;
                analysis.bidi_level = base_level;
            },
            _ => {},
        }
        chars.push(analysis);
    }

    if flags.show_line_and_paragraph_separators {
        // keeps the paragraph end out of the width
        if let Some(last) = chars.last_mut() {
            last.flags = AnalysisFlags::LineOrParagraphSeparator;
        }
    }

    Analysis { chars, has_bidi }
}

/// Appends script items for ranges of analysed text.
pub struct Itemizer<'a> {
    string: &'a [char],
    analysis: &'a [ScriptAnalysis],
    items: &'a mut Vec<ScriptItem>,
    word_finder: &'a dyn WordBoundaryFinder,
    word_starts: Option<Vec<usize>>,
}

impl<'a> Itemizer<'a> {
    pub fn new(
        string: &'a [char],
        analysis: &'a [ScriptAnalysis],
        items: &'a mut Vec<ScriptItem>,
        word_finder: &'a dyn WordBoundaryFinder,
    ) -> Self {
        Self {
            string,
            analysis,
            items,
            word_finder,
            word_starts: None,
        }
    }

    /// Itemizes `length` characters from `start` with the given mode.
    pub fn generate(&mut self, start: usize, length: usize, caps: Capitalization) {
        let end = start.saturating_add(length).min(self.analysis.len());
        if start >= end {
            return;
        }
        match caps {
            Capitalization::MixedCase => self.generate_script_items(start, end, None),
            Capitalization::AllUppercase => self.generate_script_items(start, end, Some(AnalysisFlags::Uppercase)),
            Capitalization::AllLowercase => self.generate_script_items(start, end, Some(AnalysisFlags::Lowercase)),
            Capitalization::SmallCaps => self.generate_small_caps(start, end),
            Capitalization::Capitalize => self.generate_capitalize(start, end),
        }
    }

    fn push(&mut self, position: usize, analysis: ScriptAnalysis) {
        self.items.push(ScriptItem::new(position, analysis));
    }

    /// Plain runs. With `case` set every item below `Tab` carries it.
    fn generate_script_items(&mut self, mut start: usize, end: usize, case: Option<AnalysisFlags>) {
        let emit = |analysis: ScriptAnalysis| -> ScriptAnalysis {
            match case {
                Some(flags) if !analysis.flags.is_tab_or_object() => ScriptAnalysis { flags, ..analysis },
                _ => analysis,
            }
        };
        for i in start + 1..end {
            let current = &self.analysis[i];
            let first = &self.analysis[start];
            if current.bidi_level == first.bidi_level
                && current.flags == first.flags
                && (current.script == first.script || self.string[i] == '.')
                && !current.flags.is_space_tab_or_object()
                && i - start < MAX_ITEM_LENGTH
            {
                continue;
            }
            self.push(start, emit(self.analysis[start]));
            start = i;
        }
        self.push(start, emit(self.analysis[start]));
    }

    fn is_word_start(&mut self, pos: usize) -> bool {
        let string = self.string;
        let finder = self.word_finder;
        self.word_starts
            .get_or_insert_with(|| finder.word_starts(string))
            .binary_search(&pos)
            .is_ok()
    }

    /// Word-initial characters become single-character `Uppercase` items.
    fn generate_capitalize(&mut self, mut start: usize, end: usize) {
        let mut item_analysis = self.analysis[start];
        if !item_analysis.flags.is_tab_or_object() && self.is_word_start(start) {
            item_analysis.flags = AnalysisFlags::Uppercase;
        }

        for i in start + 1..end {
            let at_word_start = !self.analysis[i].flags.is_tab_or_object() && self.is_word_start(i);
            if self.analysis[i] == item_analysis
                && !self.analysis[i].flags.is_tab_or_object()
                && !at_word_start
                && i - start < MAX_ITEM_LENGTH
            {
                continue;
            }
            self.push(start, item_analysis);
            start = i;
            item_analysis = self.analysis[start];
            if at_word_start {
                item_analysis.flags = AnalysisFlags::Uppercase;
            }
        }
        self.push(start, item_analysis);
    }

    /// Lowercase runs are split off and tagged `SmallCaps`.
    fn generate_small_caps(&mut self, mut start: usize, end: usize) {
        let small_caps = |analysis: ScriptAnalysis, lower: bool| -> ScriptAnalysis {
            if lower {
                ScriptAnalysis {
                    flags: AnalysisFlags::SmallCaps,
                    ..analysis
                }
            } else {
                analysis
            }
        };

        let mut lower = props::is_lowercase_letter(self.string[start]);
        for i in start + 1..end {
            let l = props::is_lowercase_letter(self.string[i]);
            if self.analysis[i] == self.analysis[start]
                && !self.analysis[i].flags.is_tab_or_object()
                && l == lower
                && i - start < MAX_ITEM_LENGTH
            {
                continue;
            }
            self.push(start, small_caps(self.analysis[start], lower));
            start = i;
            lower = l;
        }
        self.push(start, small_caps(self.analysis[start], lower));
    }
}
