// this_file: crates/scriptline-unicode/src/bidi.rs

//! Bidirectional run resolution.
//!
//! A single left-to-right pass over the text that assigns every character
//! an embedding level. The pass keeps a small status record (the last
//! character type seen, the last strong type, the direction at the end of
//! the pending run) and an explicit embedding stack for the
//! LRE/RLE/LRO/RLO/PDF controls. Runs are flushed
//! whenever a strong or numeric character forces a direction change.
//!
//! Set `SCRIPTLINE_DEBUG_BIDI=1` to trace every flushed run through `log`.

use std::sync::OnceLock;

use crate::props::{bidi_category, BidiCategory};

/// Deepest explicit embedding level the control stack accepts.
pub const MAX_BIDI_LEVEL: u8 = 61;

static DEBUG_BIDI: OnceLock<bool> = OnceLock::new();

fn debug_enabled() -> bool {
    *DEBUG_BIDI.get_or_init(|| {
        let enabled = std::env::var("SCRIPTLINE_DEBUG_BIDI")
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        if enabled {
            log::info!("BiDi run tracing enabled via SCRIPTLINE_DEBUG_BIDI");
        }
        enabled
    })
}

#[derive(Debug, Clone, Copy)]
struct EmbeddingContext {
    level: u8,
    override_direction: bool,
}

/// Explicit embedding state: base level plus a bounded stack of saved
/// contexts. Pushing beyond [`MAX_BIDI_LEVEL`] is rejected.
#[derive(Debug, Clone)]
pub struct BidiControl {
    stack: Vec<EmbeddingContext>,
    base: u8,
    level: u8,
    override_direction: bool,
}

impl BidiControl {
    pub fn new(rtl: bool) -> Self {
        let base = u8::from(rtl);
        Self {
            stack: Vec::with_capacity(MAX_BIDI_LEVEL as usize),
            base,
            level: base,
            override_direction: false,
        }
    }

    /// Opens an embedding (or override when `override_direction` is set).
    ///
    /// Returns `false` and leaves the state untouched when the new level
    /// would exceed [`MAX_BIDI_LEVEL`].
    pub fn embed(&mut self, rtl: bool, override_direction: bool) -> bool {
        let mut to_add = 1;
        if (self.level % 2 != 0) == rtl {
            to_add += 1;
        }
        if self.level + to_add > MAX_BIDI_LEVEL || self.stack.len() >= MAX_BIDI_LEVEL as usize {
            return false;
        }
        self.stack.push(EmbeddingContext {
            level: self.level,
            override_direction: self.override_direction,
        });
        self.override_direction = override_direction;
        self.level += to_add;
        true
    }

    pub fn can_pop(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Closes the innermost embedding. No-op on an empty stack.
    pub fn pdf(&mut self) {
        if let Some(ctx) = self.stack.pop() {
            self.level = ctx.level;
            self.override_direction = ctx.override_direction;
        }
    }

    pub fn basic_direction(&self) -> BidiCategory {
        if self.base != 0 {
            BidiCategory::R
        } else {
            BidiCategory::L
        }
    }

    pub fn base_level(&self) -> u8 {
        self.base
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_override(&self) -> bool {
        self.override_direction
    }

    /// Direction of the current embedding level.
    pub fn direction(&self) -> BidiCategory {
        if self.level % 2 != 0 {
            BidiCategory::R
        } else {
            BidiCategory::L
        }
    }
}

/// Scan state carried between characters.
#[derive(Debug, Clone, Copy)]
struct BidiStatus {
    eor: BidiCategory,
    last_strong: BidiCategory,
    last: BidiCategory,
}

/// Assigns the resolved level of the run `start..=stop` and advances both
/// cursors past it. Empty runs (`start > stop`) are ignored.
fn append_items(
    levels: &mut [u8],
    start: &mut isize,
    stop: &mut isize,
    control: &BidiControl,
    dir: BidiCategory,
) {
    use BidiCategory::*;

    if *start > *stop {
        return;
    }

    let mut level = control.level;
    if dir != On && !control.override_direction {
        if level % 2 != 0 {
            if matches!(dir, L | An | En) {
                level += 1;
            }
        } else if dir == R {
            level += 1;
        } else if matches!(dir, An | En) {
            level += 2;
        }
    }

    if debug_enabled() {
        log::trace!(
            "bidi run: dir={:?} from {} to {} level={} override={}",
            dir,
            start,
            stop,
            level,
            control.override_direction
        );
    }

    for slot in &mut levels[*start as usize..=*stop as usize] {
        *slot = level;
    }
    *stop += 1;
    *start = *stop;
}

/// Gives boundary neutrals at `sor` the level of the preceding character
/// and returns the direction of the first non-BN character (or the base
/// direction at the end of the text).
fn skip_boundary_neutrals(
    text: &[char],
    levels: &mut [u8],
    sor: &mut isize,
    eor: &mut isize,
    control: &BidiControl,
) -> BidiCategory {
    let length = text.len() as isize;
    let mut dir = control.basic_direction();
    let level = if *sor > 0 {
        levels[(*sor - 1) as usize]
    } else {
        control.level
    };
    while *sor < length {
        dir = bidi_category(text[*sor as usize]);
        if dir != BidiCategory::Bn {
            break;
        }
        levels[*sor as usize] = level;
        *sor += 1;
    }

    *eor = *sor;
    if *eor == length {
        dir = control.basic_direction();
    }
    dir
}

/// Resolves embedding levels for `text` into `levels`.
///
/// `levels` must be at least as long as `text`. Returns whether the text
/// needs bidirectional treatment: right-to-left characters, Arabic numbers
/// or right-to-left embeddings were seen, or the base direction is RTL.
pub fn bidi_itemize(text: &[char], rtl: bool, levels: &mut [u8]) -> bool {
    let mut control = BidiControl::new(rtl);
    resolve_with_control(text, &mut control, levels)
}

/// Same as [`bidi_itemize`] with a caller-provided control, so embeddings
/// opened by an enclosing context are honoured.
pub fn resolve_with_control(text: &[char], control: &mut BidiControl, levels: &mut [u8]) -> bool {
    use BidiCategory::*;

    let right_to_left = control.basic_direction() == R;
    let mut has_bidi = right_to_left;

    let length = text.len() as isize;
    if length == 0 {
        return has_bidi;
    }

    let mut sor: isize = 0;
    let mut eor: isize = -1;
    let mut current: isize = 0;

    let mut dir = if right_to_left { R } else { L };

    let mut sdir = bidi_category(text[0]);
    if !matches!(sdir, L | R | En | An) {
        sdir = On;
    } else {
        dir = On;
    }
    let mut status = BidiStatus {
        eor: sdir,
        last_strong: if right_to_left { R } else { L },
        last: if right_to_left { R } else { L },
    };

    while current <= length {
        let mut dir_current = if current == length {
            control.basic_direction()
        } else {
            bidi_category(text[current as usize])
        };

        match dir_current {
            // embeddings and overrides
            Rle | Rlo | Lre | Lro => {
                let rtl = matches!(dir_current, Rle | Rlo);
                has_bidi |= rtl;
                let override_direction = matches!(dir_current, Lro | Rlo);

                let mut level = control.level + 1;
                if (level % 2 != 0) == rtl {
                    level += 1;
                }
                if level < MAX_BIDI_LEVEL {
                    eor = current - 1;
                    append_items(levels, &mut sor, &mut eor, control, dir);
                    eor = current;
                    control.embed(rtl, override_direction);
                    let edir = if rtl { R } else { L };
                    dir = edir;
                    status.eor = edir;
                    status.last_strong = edir;
                }
            },
            Pdf => {
                if control.can_pop() {
                    if dir != control.direction() {
                        eor = current - 1;
                        append_items(levels, &mut sor, &mut eor, control, dir);
                        dir = control.direction();
                    }
                    eor = current;
                    append_items(levels, &mut sor, &mut eor, control, dir);
                    control.pdf();
                    status.eor = On;
                    status.last = control.direction();
                    dir = if control.override_direction {
                        control.direction()
                    } else {
                        On
                    };
                    status.last_strong = control.direction();
                }
            },

            // strong types
            L => {
                if dir == On {
                    dir = L;
                }
                match status.last {
                    L => {
                        eor = current;
                        status.eor = L;
                    },
                    R | Al | En | An => {
                        if eor >= 0 {
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            dir = skip_boundary_neutrals(text, levels, &mut sor, &mut eor, control);
                            status.eor = dir;
                        } else {
                            eor = current;
                            status.eor = dir;
                        }
                    },
                    Es | Et | Cs | Bn | B | S | Ws | On => {
                        if dir != L {
                            // trailing neutrals take the embedding direction
                            if control.direction() == R {
                                if status.eor != R {
                                    // AN or EN
                                    append_items(levels, &mut sor, &mut eor, control, dir);
                                    status.eor = On;
                                    dir = R;
                                }
                                eor = current - 1;
                                append_items(levels, &mut sor, &mut eor, control, dir);
                                dir = skip_boundary_neutrals(text, levels, &mut sor, &mut eor, control);
                                status.eor = dir;
                            } else if status.eor != L {
                                append_items(levels, &mut sor, &mut eor, control, dir);
                                status.eor = On;
                                dir = L;
                            } else {
                                eor = current;
                                status.eor = L;
                            }
                        } else {
                            eor = current;
                            status.eor = L;
                        }
                    },
                    _ => {},
                }
                status.last_strong = L;
            },
            Al | R => {
                has_bidi = true;
                if dir == On {
                    dir = R;
                }
                match status.last {
                    L | En | An | R | Al => {
                        if matches!(status.last, L | En | An) && eor >= 0 {
                            append_items(levels, &mut sor, &mut eor, control, dir);
                        }
                        dir = R;
                        eor = current;
                        status.eor = R;
                    },
                    Es | Et | Cs | Bn | B | S | Ws | On => {
                        if status.eor != R && status.eor != Al {
                            // trailing neutrals take the embedding direction
                            if control.direction() == R || status.last_strong == R || status.last_strong == Al {
                                append_items(levels, &mut sor, &mut eor, control, dir);
                                dir = R;
                                status.eor = On;
                                eor = current;
                            } else {
                                eor = current - 1;
                                append_items(levels, &mut sor, &mut eor, control, dir);
                                dir = R;
                                status.eor = On;
                            }
                        } else {
                            eor = current;
                            status.eor = R;
                        }
                    },
                    _ => {},
                }
                status.last_strong = dir_current;
            },

            // weak types
            Nsm => {
                if eor == current - 1 {
                    eor = current;
                }
            },
            En if status.last_strong != Al => {
                if dir == On {
                    dir = if status.last_strong == L { L } else { En };
                }
                match status.last {
                    Et | En | L => {
                        if status.last == Et && (status.last_strong == R || status.last_strong == Al) {
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            status.eor = On;
                            dir = An;
                        }
                        eor = current;
                        status.eor = dir_current;
                    },
                    R | Al | An => {
                        if eor >= 0 {
                            append_items(levels, &mut sor, &mut eor, control, dir);
                        } else {
                            eor = current;
                        }
                        status.eor = En;
                        dir = An;
                    },
                    Es | Cs if status.eor == En || dir == An => {
                        eor = current;
                    },
                    Es | Cs | Bn | B | S | Ws | On => {
                        if status.eor == R {
                            // neutrals go to R
                            eor = current - 1;
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            status.eor = En;
                            dir = An;
                        } else if status.eor == L || (status.eor == En && status.last_strong == L) {
                            eor = current;
                            status.eor = dir_current;
                        } else if dir != L {
                            // numbers on both sides, neutrals get right to left direction
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            status.eor = On;
                            eor = current - 1;
                            dir = R;
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            status.eor = On;
                            dir = An;
                        } else {
                            eor = current;
                            status.eor = dir_current;
                        }
                    },
                    _ => {},
                }
            },
            // EN after an Arabic letter resolves as AN
            En | An => {
                has_bidi = true;
                dir_current = An;
                if dir == On {
                    dir = An;
                }
                match status.last {
                    L | An => {
                        eor = current;
                        status.eor = An;
                    },
                    R | Al | En => {
                        if eor >= 0 {
                            append_items(levels, &mut sor, &mut eor, control, dir);
                        } else {
                            eor = current;
                        }
                        dir = An;
                        status.eor = An;
                    },
                    Cs if status.eor == An => {
                        eor = current;
                    },
                    Cs | Es | Et | Bn | B | S | Ws | On => {
                        if status.eor == R {
                            // neutrals go to R
                            eor = current - 1;
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            status.eor = An;
                            dir = An;
                        } else if status.eor == L || (status.eor == En && status.last_strong == L) {
                            eor = current;
                            status.eor = dir_current;
                        } else if dir != L {
                            // numbers on both sides, neutrals get right to left direction
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            status.eor = On;
                            eor = current - 1;
                            dir = R;
                            append_items(levels, &mut sor, &mut eor, control, dir);
                            status.eor = An;
                            dir = An;
                        } else {
                            eor = current;
                            status.eor = dir_current;
                        }
                    },
                    _ => {},
                }
            },
            Et => {
                if status.last == En {
                    dir_current = En;
                    eor = current;
                    status.eor = dir_current;
                }
            },
            // a paragraph separator closes every open embedding and sits at
            // the base level itself
            B => {
                if control.can_pop() {
                    eor = current - 1;
                    append_items(levels, &mut sor, &mut eor, control, dir);
                    while control.can_pop() {
                        control.pdf();
                    }
                    dir = control.direction();
                    eor = current;
                    append_items(levels, &mut sor, &mut eor, control, dir);
                    dir = On;
                    status.eor = On;
                    status.last_strong = control.direction();
                }
            },
            // separators and neutrals wait for the next strong type;
            // boundary neutrals are transparent
            Es | Cs | Bn | S | Ws | On => {},
        }

        if current >= length {
            break;
        }

        // set status.last as needed
        match dir_current {
            Et | Es | Cs | S | Ws | On => {
                status.last = match status.last {
                    L | R | Al | En | An => dir_current,
                    _ => On,
                };
            },
            Nsm | Bn => {},
            Lro | Lre => status.last = L,
            Rlo | Rle => status.last = R,
            En if status.last == L => status.last = L,
            _ => status.last = dir_current,
        }

        current += 1;
    }

    // drop the virtual end-of-text character
    eor = current - 1;
    if sor <= eor {
        append_items(levels, &mut sor, &mut eor, control, dir);
    }

    has_bidi
}

/// Visual order of `levels` according to rule L2: from the highest level
/// down to the lowest odd level, reverse every contiguous run at that
/// level or higher.
///
/// `result[visual] == logical`.
pub fn reorder_levels(levels: &[u8]) -> Vec<usize> {
    let count = levels.len();
    let mut visual_order: Vec<usize> = (0..count).collect();
    if count == 0 {
        return visual_order;
    }

    let mut level_low = u8::MAX;
    let mut level_high = 0u8;
    for &level in levels {
        level_high = level_high.max(level);
        level_low = level_low.min(level);
    }

    // reversing is only done up to the lowest odd level
    if level_low % 2 == 0 {
        level_low += 1;
    }

    let last = count - 1;
    while level_high >= level_low {
        let mut i = 0;
        while i < last {
            while i < last && levels[i] < level_high {
                i += 1;
            }
            let start = i;
            while i <= last && levels[i] >= level_high {
                i += 1;
            }
            if i > start + 1 {
                visual_order[start..i].reverse();
            }
            i += 1;
        }
        level_high -= 1;
    }

    visual_order
}

/// Whether the first strong character of `text` is right-to-left.
/// Text without strong characters is left-to-right.
pub fn first_strong_is_rtl(text: &[char]) -> bool {
    for &ch in text {
        match bidi_category(ch) {
            BidiCategory::L => return false,
            BidiCategory::R | BidiCategory::Al => return true,
            _ => {},
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_of(text: &str, rtl: bool) -> (Vec<u8>, bool) {
        let chars: Vec<char> = text.chars().collect();
        let mut levels = vec![0u8; chars.len()];
        let has_bidi = bidi_itemize(&chars, rtl, &mut levels);
        (levels, has_bidi)
    }

    #[test]
    fn embed_adds_one_or_two_levels() {
        let mut control = BidiControl::new(false);
        assert!(control.embed(true, false));
        assert_eq!(control.level(), 1);
        assert!(control.embed(true, false));
        assert_eq!(control.level(), 3);
        assert!(control.embed(false, true));
        assert_eq!(control.level(), 4);
        assert!(control.is_override());
        control.pdf();
        assert_eq!(control.level(), 3);
        assert!(!control.is_override());
    }

    #[test]
    fn embed_rejects_levels_past_the_maximum() {
        let mut control = BidiControl::new(false);
        while control.embed(false, false) {}
        assert!(control.level() <= MAX_BIDI_LEVEL);
        let depth = control.depth();
        assert!(!control.embed(true, false));
        assert_eq!(control.depth(), depth);
    }

    #[test]
    fn pdf_on_empty_stack_is_ignored() {
        let mut control = BidiControl::new(true);
        control.pdf();
        assert_eq!(control.level(), 1);
        assert_eq!(control.base_level(), 1);
    }

    #[test]
    fn ltr_text_stays_at_level_zero() {
        let (levels, has_bidi) = levels_of("hello, world 42", false);
        assert!(levels.iter().all(|&l| l == 0));
        assert!(!has_bidi);
    }

    #[test]
    fn hebrew_in_ltr_paragraph_is_level_one() {
        let (levels, has_bidi) = levels_of("abc \u{05d0}\u{05d1}\u{05d2} def", false);
        assert!(has_bidi);
        assert_eq!(&levels[0..4], &[0, 0, 0, 0]);
        assert_eq!(&levels[4..7], &[1, 1, 1]);
        assert_eq!(&levels[7..], &[0, 0, 0, 0]);
    }

    #[test]
    fn european_numbers_in_rtl_paragraph_are_level_two() {
        let (levels, _) = levels_of("\u{05d0} 12", true);
        assert_eq!(levels[0], 1);
        assert_eq!(&levels[2..], &[2, 2]);
    }

    #[test]
    fn rle_raises_the_embedded_run() {
        let (levels, has_bidi) = levels_of("a\u{202b}b\u{202c}c", false);
        assert!(has_bidi);
        assert_eq!(levels[0], 0);
        assert_eq!(levels[2], 2);
        assert_eq!(levels[4], 0);
    }

    #[test]
    fn paragraph_separator_closes_embeddings() {
        let (levels, _) = levels_of("\u{202b}a\u{2029}b", false);
        assert_eq!(levels[1], 2);
        assert_eq!(levels[2], 0);
        assert_eq!(levels[3], 0);
    }

    #[test]
    fn reorder_reverses_odd_runs() {
        assert_eq!(reorder_levels(&[0, 1, 1, 1, 0]), vec![0, 3, 2, 1, 4]);
        assert_eq!(reorder_levels(&[1, 1, 1]), vec![2, 1, 0]);
        assert_eq!(reorder_levels(&[1, 2, 2, 1]), vec![3, 1, 2, 0]);
        assert_eq!(reorder_levels(&[0]), vec![0]);
        assert!(reorder_levels(&[]).is_empty());
    }

    #[test]
    fn first_strong_direction() {
        assert!(!first_strong_is_rtl(&['1', ' ', 'a']));
        assert!(first_strong_is_rtl(&['1', ' ', '\u{05d0}']));
        assert!(!first_strong_is_rtl(&[' ', '.']));
    }
}
