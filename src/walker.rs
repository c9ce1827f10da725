//! Tree walkers that replace translatable text in place.
//!
//! Every walker visits its containers depth-first in document order and hands
//! each non-blank [`TextUnit`] to the gateway. Structure is never touched:
//! only the text payload of existing units changes.

use crate::gateway::{Gateway, Translate};
use crate::model::{
    Block, CellValue, Document, Presentation, Shape, ShapeKind, Table, TextFrame, TextUnit,
    WordDocument, Workbook,
};
use crate::progress::{ProgressSink, Reporter};

/// Top-level paragraphs between two progress reports of the Word walker.
pub const WORD_REPORT_INTERVAL: usize = 10;
/// Word progress stops here until tables are done.
pub const WORD_PARAGRAPH_CEILING: f32 = 0.9;

pub trait Walk {
    fn walk<T: Translate, S: ProgressSink>(
        &mut self,
        gateway: &Gateway<T>,
        progress: &mut Reporter<S>,
    );
}

/// Read-only visit of every text unit, in walking order.
pub trait VisitText {
    fn visit_text<'a>(&'a self, f: &mut dyn FnMut(&'a TextUnit));

    fn text_units(&self) -> Vec<&TextUnit> {
        let mut units = Vec::new();
        self.visit_text(&mut |unit| units.push(unit));
        units
    }
}

fn translate_unit<T: Translate>(unit: &mut TextUnit, gateway: &Gateway<T>) {
    if unit.is_blank() {
        return;
    }
    let translated = gateway.translate(unit.text());
    unit.set_text(translated);
}

impl Walk for WordDocument {
    fn walk<T: Translate, S: ProgressSink>(
        &mut self,
        gateway: &Gateway<T>,
        progress: &mut Reporter<S>,
    ) {
        let total = self.paragraphs().count();
        for (i, para) in self.paragraphs_mut().enumerate() {
            translate_unit(para, gateway);
            if i % WORD_REPORT_INTERVAL == 0 {
                progress.report((i as f32 / total as f32).min(WORD_PARAGRAPH_CEILING));
            }
        }

        for table in self.tables_mut() {
            translate_table(table, gateway);
        }
        progress.finish();
    }
}

fn translate_table<T: Translate>(table: &mut Table, gateway: &Gateway<T>) {
    for row in &mut table.rows {
        for cell in &mut row.cells {
            for block in &mut cell.blocks {
                match block {
                    Block::Paragraph(para) => translate_unit(para, gateway),
                    Block::Table(nested) => translate_table(nested, gateway),
                }
            }
        }
    }
}

impl Walk for Workbook {
    fn walk<T: Translate, S: ProgressSink>(
        &mut self,
        gateway: &Gateway<T>,
        progress: &mut Reporter<S>,
    ) {
        let total = self.sheets.len();
        for (i, sheet) in self.sheets.iter_mut().enumerate() {
            progress.report_ratio(i, total);
            log::debug!("translating sheet {:?}", sheet.name);
            for row in &mut sheet.rows {
                for cell in &mut row.cells {
                    // Numbers, booleans and formulas are never sent out.
                    if let CellValue::Text(unit) = &mut cell.value
                        && !unit.text().starts_with('=')
                    {
                        translate_unit(unit, gateway);
                    }
                }
            }
        }
        progress.finish();
    }
}

impl Walk for Presentation {
    fn walk<T: Translate, S: ProgressSink>(
        &mut self,
        gateway: &Gateway<T>,
        progress: &mut Reporter<S>,
    ) {
        let total = self.slides.len();
        for (i, slide) in self.slides.iter_mut().enumerate() {
            progress.report_ratio(i, total);
            log::debug!("translating slide {} ({} shapes)", i + 1, slide.shapes.len());
            for shape in &mut slide.shapes {
                visit_shape(shape, gateway);
            }
        }
        progress.finish();
    }
}

/// Pre-order: a group's children are all done before its next sibling.
fn visit_shape<T: Translate>(shape: &mut Shape, gateway: &Gateway<T>) {
    match &mut shape.kind {
        ShapeKind::Group(children) => {
            for child in children {
                visit_shape(child, gateway);
            }
        }
        ShapeKind::TextFrame(frame) => translate_frame(frame, gateway),
        ShapeKind::Table(table) => {
            for row in &mut table.rows {
                for cell in &mut row.cells {
                    if let Some(frame) = &mut cell.text_frame {
                        translate_frame(frame, gateway);
                    }
                }
            }
        }
        ShapeKind::Other => {}
    }
}

fn translate_frame<T: Translate>(frame: &mut TextFrame, gateway: &Gateway<T>) {
    for para in &mut frame.paragraphs {
        translate_unit(para, gateway);
    }
}

impl Walk for Document {
    fn walk<T: Translate, S: ProgressSink>(
        &mut self,
        gateway: &Gateway<T>,
        progress: &mut Reporter<S>,
    ) {
        match self {
            Document::Word(doc) => doc.walk(gateway, progress),
            Document::Sheet(workbook) => workbook.walk(gateway, progress),
            Document::Slides(presentation) => presentation.walk(gateway, progress),
        }
    }
}

impl VisitText for WordDocument {
    fn visit_text<'a>(&'a self, f: &mut dyn FnMut(&'a TextUnit)) {
        for para in self.paragraphs() {
            f(para);
        }
        for table in self.tables() {
            visit_table(table, f);
        }
    }
}

fn visit_table<'a>(table: &'a Table, f: &mut dyn FnMut(&'a TextUnit)) {
    for cell in table.rows.iter().flat_map(|r| &r.cells) {
        for block in &cell.blocks {
            match block {
                Block::Paragraph(para) => f(para),
                Block::Table(nested) => visit_table(nested, f),
            }
        }
    }
}

impl VisitText for Workbook {
    fn visit_text<'a>(&'a self, f: &mut dyn FnMut(&'a TextUnit)) {
        let cells = self.sheets.iter().flat_map(|s| &s.rows).flat_map(|r| &r.cells);
        for cell in cells {
            if let CellValue::Text(unit) = &cell.value {
                f(unit);
            }
        }
    }
}

impl VisitText for Presentation {
    fn visit_text<'a>(&'a self, f: &mut dyn FnMut(&'a TextUnit)) {
        for shape in self.slides.iter().flat_map(|s| &s.shapes) {
            visit_shape_text(shape, f);
        }
    }
}

fn visit_shape_text<'a>(shape: &'a Shape, f: &mut dyn FnMut(&'a TextUnit)) {
    match &shape.kind {
        ShapeKind::Group(children) => {
            for child in children {
                visit_shape_text(child, f);
            }
        }
        ShapeKind::TextFrame(frame) => frame.paragraphs.iter().for_each(|p| f(p)),
        ShapeKind::Table(table) => {
            let frames = table.rows.iter().flat_map(|r| &r.cells).filter_map(|c| c.text_frame.as_ref());
            for frame in frames {
                frame.paragraphs.iter().for_each(|p| f(p));
            }
        }
        ShapeKind::Other => {}
    }
}

impl VisitText for Document {
    fn visit_text<'a>(&'a self, f: &mut dyn FnMut(&'a TextUnit)) {
        match self {
            Document::Word(doc) => doc.visit_text(f),
            Document::Sheet(workbook) => workbook.visit_text(f),
            Document::Slides(presentation) => presentation.visit_text(f),
        }
    }
}
