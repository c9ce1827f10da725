use roxmltree::Node;

use crate::error::PackageError;
use crate::model::{CellValue, SheetCell, SheetRow, TextUnit, Workbook, Worksheet};
use crate::package::{self, Package, PartId, REL_NS, TextCollector};

const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

fn sml<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    package::child(node, SML_NS, name)
}

fn is_sml(node: Node, name: &str) -> bool {
    package::is_element(node, SML_NS, name)
}

pub fn load(package: &Package) -> Result<Workbook, PackageError> {
    let main = package.main_part("xl/workbook.xml")?;
    let rels = package.relationships(&main)?;

    let shared = match rels.iter().find(|r| r.rel_type.ends_with("/sharedStrings")) {
        Some(rel) => load_shared_strings(package, &rel.target)?,
        None => Vec::new(),
    };

    let (_, content) = package.xml(&main)?;
    let xml = roxmltree::Document::parse(content)?;
    let sheets = sml(xml.root_element(), "sheets")
        .ok_or_else(|| PackageError::Malformed("workbook has no sheets".into()))?;

    let mut workbook = Workbook::default();
    for sheet in sheets.children().filter(|n| is_sml(*n, "sheet")) {
        let name = sheet.attribute("name").unwrap_or_default().to_string();
        let rel = sheet
            .attribute((REL_NS, "id"))
            .and_then(|id| rels.iter().find(|r| r.id == id))
            .ok_or_else(|| PackageError::Malformed(format!("sheet {name:?} has no target")))?;
        // Chartsheets and dialog sheets hold no cells.
        if !rel.rel_type.ends_with("/worksheet") {
            log::debug!("skipping sheet {name:?} ({})", rel.rel_type);
            continue;
        }
        workbook.sheets.push(load_worksheet(package, name, &rel.target, &shared)?);
    }

    log::debug!("{main}: {} worksheets, {} shared strings", workbook.sheets.len(), shared.len());
    Ok(workbook)
}

/// Entries of the shared string table. Cells referencing the same entry get
/// a copy of its unit and so share its anchor.
fn load_shared_strings(package: &Package, name: &str) -> Result<Vec<TextUnit>, PackageError> {
    let (part, content) = package.xml(name)?;
    let xml = roxmltree::Document::parse(content)?;
    Ok(xml
        .root_element()
        .children()
        .filter(|n| is_sml(*n, "si"))
        .map(|si| rich_text(si, part))
        .collect())
}

/// Text of a string item: a plain `t`, or the `t` of each rich run.
/// Phonetic runs are left out.
fn rich_text(item: Node, part: PartId) -> TextUnit {
    let mut text = TextCollector::new(true);
    for child in item.children() {
        if is_sml(child, "t") {
            text.push_text(child);
        } else if is_sml(child, "r")
            && let Some(t) = sml(child, "t")
        {
            text.push_text(t);
        }
    }
    text.finish(part)
}

fn load_worksheet(
    package: &Package,
    name: String,
    part_name: &str,
    shared: &[TextUnit],
) -> Result<Worksheet, PackageError> {
    let (part, content) = package.xml(part_name)?;
    let xml = roxmltree::Document::parse(content)?;

    let Some(data) = sml(xml.root_element(), "sheetData") else {
        return Ok(Worksheet { name, rows: Vec::new() });
    };

    let rows = data
        .children()
        .filter(|n| is_sml(*n, "row"))
        .map(|row| SheetRow {
            cells: row
                .children()
                .filter(|n| is_sml(*n, "c"))
                .filter_map(|c| parse_cell(c, part, shared))
                .collect(),
        })
        .collect();
    Ok(Worksheet { name, rows })
}

fn parse_cell(c: Node, part: PartId, shared: &[TextUnit]) -> Option<SheetCell> {
    let reference = c.attribute("r").unwrap_or_default();

    if let Some(f) = sml(c, "f") {
        let formula = format!("={}", f.text().unwrap_or_default());
        return Some(SheetCell::new(reference, CellValue::Formula(formula)));
    }

    let v = sml(c, "v");
    let raw = v.and_then(|v| v.text());
    let value = match c.attribute("t") {
        Some("s") => {
            let entry = shared.get(raw?.trim().parse::<usize>().ok()?)?;
            CellValue::Text(entry.clone())
        }
        Some("inlineStr") => CellValue::Text(rich_text(sml(c, "is")?, part)),
        Some("str") => {
            let mut text = TextCollector::new(false);
            text.push_text(v?);
            CellValue::Text(text.finish(part))
        }
        Some("b") => CellValue::Bool(raw?.trim() == "1"),
        Some("e") => CellValue::Error(raw?.to_string()),
        Some("d") => CellValue::Date(raw?.to_string()),
        _ => CellValue::Number(raw?.trim().parse().ok()?),
    };
    Some(SheetCell::new(reference, value))
}
