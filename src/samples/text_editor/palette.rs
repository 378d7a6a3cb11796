use egui::Color32;

use super::language::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    Dark,
    Light,
    RetroBlue,
}

impl PaletteKind {
    pub const ALL: [PaletteKind; 3] = [PaletteKind::Dark, PaletteKind::Light, PaletteKind::RetroBlue];

    pub fn label(self) -> &'static str {
        match self {
            PaletteKind::Dark => "Dark palette",
            PaletteKind::Light => "Light palette",
            PaletteKind::RetroBlue => "Retro blue palette",
        }
    }
}

/// Token colors plus the editor background and the error marker line highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub kind: PaletteKind,
    pub default: Color32,
    pub keyword: Color32,
    pub number: Color32,
    pub string: Color32,
    pub char_literal: Color32,
    pub punctuation: Color32,
    pub preprocessor: Color32,
    pub identifier: Color32,
    pub known_identifier: Color32,
    pub preproc_identifier: Color32,
    pub comment: Color32,
    pub multi_line_comment: Color32,
    pub background: Color32,
    pub error_marker: Color32,
    pub dark_mode: bool,
}

impl Palette {
    pub fn new(kind: PaletteKind) -> Self {
        match kind {
            PaletteKind::Dark => Self::dark(),
            PaletteKind::Light => Self::light(),
            PaletteKind::RetroBlue => Self::retro_blue(),
        }
    }

    pub fn dark() -> Self {
        Self {
            kind: PaletteKind::Dark,
            default: Color32::from_rgb(0x7f, 0x7f, 0x7f),
            keyword: Color32::from_rgb(0x56, 0x9c, 0xd6),
            number: Color32::from_rgb(0x00, 0xff, 0x00),
            string: Color32::from_rgb(0xe0, 0x70, 0x70),
            char_literal: Color32::from_rgb(0xe0, 0xa0, 0x70),
            punctuation: Color32::from_rgb(0xff, 0xff, 0xff),
            preprocessor: Color32::from_rgb(0x80, 0x80, 0x40),
            identifier: Color32::from_rgb(0xaa, 0xaa, 0xaa),
            known_identifier: Color32::from_rgb(0x9b, 0xc6, 0x4d),
            preproc_identifier: Color32::from_rgb(0xc0, 0x40, 0xa0),
            comment: Color32::from_rgb(0x20, 0x60, 0x20),
            multi_line_comment: Color32::from_rgb(0x40, 0x60, 0x20),
            background: Color32::from_rgb(0x10, 0x10, 0x10),
            error_marker: Color32::from_rgba_unmultiplied(0xff, 0x20, 0x00, 0x80),
            dark_mode: true,
        }
    }

    pub fn light() -> Self {
        Self {
            kind: PaletteKind::Light,
            default: Color32::from_rgb(0x40, 0x40, 0x40),
            keyword: Color32::from_rgb(0x06, 0x0c, 0xff),
            number: Color32::from_rgb(0x00, 0x80, 0x00),
            string: Color32::from_rgb(0xa0, 0x20, 0x20),
            char_literal: Color32::from_rgb(0x70, 0x40, 0x30),
            punctuation: Color32::from_rgb(0x00, 0x00, 0x00),
            preprocessor: Color32::from_rgb(0x40, 0x60, 0x60),
            identifier: Color32::from_rgb(0x40, 0x40, 0x40),
            known_identifier: Color32::from_rgb(0x10, 0x60, 0x60),
            preproc_identifier: Color32::from_rgb(0xa0, 0x40, 0xc0),
            comment: Color32::from_rgb(0x20, 0x50, 0xa0),
            multi_line_comment: Color32::from_rgb(0x40, 0x50, 0xa0),
            background: Color32::from_rgb(0xff, 0xff, 0xff),
            error_marker: Color32::from_rgba_unmultiplied(0xff, 0x10, 0x00, 0xa0),
            dark_mode: false,
        }
    }

    pub fn retro_blue() -> Self {
        Self {
            kind: PaletteKind::RetroBlue,
            default: Color32::from_rgb(0x00, 0xff, 0xff),
            keyword: Color32::from_rgb(0xff, 0xff, 0x00),
            number: Color32::from_rgb(0x00, 0xff, 0x00),
            string: Color32::from_rgb(0x80, 0x80, 0x00),
            char_literal: Color32::from_rgb(0x80, 0x80, 0x00),
            punctuation: Color32::from_rgb(0xff, 0xff, 0xff),
            preprocessor: Color32::from_rgb(0x00, 0x80, 0x00),
            identifier: Color32::from_rgb(0x00, 0xff, 0xff),
            known_identifier: Color32::from_rgb(0xff, 0xff, 0xff),
            preproc_identifier: Color32::from_rgb(0xff, 0x00, 0xff),
            comment: Color32::from_rgb(0x80, 0x80, 0x80),
            multi_line_comment: Color32::from_rgb(0x40, 0x40, 0x40),
            background: Color32::from_rgb(0x00, 0x00, 0x80),
            error_marker: Color32::from_rgba_unmultiplied(0xff, 0x00, 0x00, 0xa0),
            dark_mode: true,
        }
    }

    pub fn color(&self, kind: TokenKind) -> Color32 {
        match kind {
            TokenKind::Default => self.default,
            TokenKind::Keyword => self.keyword,
            TokenKind::Number => self.number,
            TokenKind::String => self.string,
            TokenKind::CharLiteral => self.char_literal,
            TokenKind::Punctuation => self.punctuation,
            TokenKind::Preprocessor => self.preprocessor,
            TokenKind::Identifier => self.identifier,
            TokenKind::KnownIdentifier => self.known_identifier,
            TokenKind::PreprocIdentifier => self.preproc_identifier,
            TokenKind::Comment => self.comment,
            TokenKind::MultiLineComment => self.multi_line_comment,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
