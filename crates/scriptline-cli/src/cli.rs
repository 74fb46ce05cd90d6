//! Argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// scriptline: paragraph layout for complex scripts
#[derive(Parser, Debug)]
#[command(name = "scriptline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub font: FontArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct FontArgs {
    /// OpenType font file; square box glyphs when omitted
    #[arg(short = 'f', long = "font-file", alias = "font", global = true)]
    pub font_file: Option<PathBuf>,

    /// Face index inside a font collection
    #[arg(long = "face-index", default_value_t = 0, global = true)]
    pub face_index: u32,

    /// Font size in pixels
    #[arg(short = 's', long = "font-size", alias = "size", default_value_t = 16, global = true)]
    pub font_size: i32,

    /// Paragraph direction
    #[arg(short = 'd', long, value_enum, default_value_t = Direction::Auto, global = true)]
    pub direction: Direction,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the script items of a text
    Itemize {
        text: String,
    },

    /// Width and bounding boxes of a character range
    Measure {
        text: String,

        /// First character of the range
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Characters in the range; the rest of the text when omitted
        #[arg(long)]
        len: Option<usize>,
    },

    /// Shorten a text to a width with an ellipsis
    Elide {
        text: String,

        /// Available width in pixels
        #[arg(short, long)]
        width: f32,

        /// Where the text is cut
        #[arg(short, long, value_enum, default_value_t = Mode::Right)]
        mode: Mode,

        /// Treat '&' as a mnemonic marker
        #[arg(long)]
        mnemonic: bool,
    },

    /// Break a paragraph into lines of a width and align them
    Justify {
        text: String,

        /// Line width in pixels
        #[arg(short, long)]
        width: f32,

        #[arg(short, long, value_enum, default_value_t = Align::Justify)]
        align: Align,

        /// Justify the last line too
        #[arg(long)]
        force: bool,
    },

    /// Cursor stops around a text position
    Cursor {
        text: String,

        /// Cursor position in characters
        #[arg(short, long, default_value_t = 0)]
        pos: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Auto,
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Left,
    Right,
    Middle,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Align {
    Left,
    Right,
    Center,
    Justify,
}
