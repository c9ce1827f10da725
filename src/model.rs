use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;
use crate::package::Anchor;

/// A run of plain text owned by a paragraph, cell or text frame paragraph.
///
/// Units loaded from a package remember where their text lives in the source
/// XML; replacing the text never creates or removes siblings.
#[derive(Clone, Debug)]
pub struct TextUnit {
    text: String,
    original: String,
    anchor: Option<Anchor>,
}

impl TextUnit {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        TextUnit { original: text.clone(), text, anchor: None }
    }

    pub(crate) fn anchored(text: String, anchor: Anchor) -> Self {
        TextUnit { original: text.clone(), text, anchor: Some(anchor) }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_modified(&self) -> bool {
        self.text != self.original
    }

    pub(crate) fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }
}

impl PartialEq for TextUnit {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl PartialEq<&str> for TextUnit {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

// Word

#[derive(Clone, Debug, Default)]
pub struct WordDocument {
    pub body: Vec<Block>,
}

#[derive(Clone, Debug)]
pub enum Block {
    Paragraph(TextUnit),
    Table(Table),
}

#[derive(Clone, Debug, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Clone, Debug, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, Default)]
pub struct Cell {
    pub blocks: Vec<Block>,
}

impl WordDocument {
    pub fn paragraphs(&self) -> impl Iterator<Item = &TextUnit> {
        self.body.iter().filter_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut TextUnit> {
        self.body.iter_mut().filter_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|block| match block {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.body.iter_mut().filter_map(|block| match block {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }
}

// Sheet

#[derive(Clone, Debug, Default)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
}

#[derive(Clone, Debug, Default)]
pub struct Worksheet {
    pub name: String,
    pub rows: Vec<SheetRow>,
}

#[derive(Clone, Debug, Default)]
pub struct SheetRow {
    pub cells: Vec<SheetCell>,
}

#[derive(Clone, Debug)]
pub struct SheetCell {
    pub reference: String,
    pub value: CellValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(TextUnit),
    Number(f64),
    Bool(bool),
    /// Formula source including the leading `=`.
    Formula(String),
    Error(String),
    Date(String),
}

impl SheetCell {
    pub fn new(reference: impl Into<String>, value: CellValue) -> Self {
        SheetCell { reference: reference.into(), value }
    }
}

// Slides

#[derive(Clone, Debug, Default)]
pub struct Presentation {
    pub slides: Vec<Slide>,
}

#[derive(Clone, Debug, Default)]
pub struct Slide {
    pub shapes: Vec<Shape>,
}

#[derive(Clone, Debug)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
}

#[derive(Clone, Debug)]
pub enum ShapeKind {
    Group(Vec<Shape>),
    TextFrame(TextFrame),
    Table(ShapeTable),
    Other,
}

#[derive(Clone, Debug, Default)]
pub struct TextFrame {
    pub paragraphs: Vec<TextUnit>,
}

#[derive(Clone, Debug, Default)]
pub struct ShapeTable {
    pub rows: Vec<ShapeRow>,
}

#[derive(Clone, Debug, Default)]
pub struct ShapeRow {
    pub cells: Vec<ShapeCell>,
}

#[derive(Clone, Debug, Default)]
pub struct ShapeCell {
    pub text_frame: Option<TextFrame>,
}

impl Shape {
    pub fn new(name: impl Into<String>, kind: ShapeKind) -> Self {
        Shape { name: name.into(), kind }
    }
}

impl TextFrame {
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        TextFrame { paragraphs: texts.into_iter().map(TextUnit::new).collect() }
    }
}

/// A loaded document tree of one of the supported kinds.
#[derive(Clone, Debug)]
pub enum Document {
    Word(WordDocument),
    Sheet(Workbook),
    Slides(Presentation),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Word(_) => DocumentKind::Word,
            Document::Sheet(_) => DocumentKind::Sheet,
            Document::Slides(_) => DocumentKind::Slides,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Word,
    Sheet,
    Slides,
}

impl DocumentKind {
    /// Infers the kind from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedKind(path.display().to_string()))?;
        ext.parse()
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Word => "docx",
            DocumentKind::Sheet => "xlsx",
            DocumentKind::Slides => "pptx",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "docx" | "word" => Ok(DocumentKind::Word),
            "xlsx" | "excel" | "sheet" => Ok(DocumentKind::Sheet),
            "pptx" | "powerpoint" | "slides" => Ok(DocumentKind::Slides),
            _ => Err(Error::UnsupportedKind(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
