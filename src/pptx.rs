use roxmltree::Node;

use crate::error::PackageError;
use crate::model::{
    Presentation, Shape, ShapeCell, ShapeKind, ShapeRow, ShapeTable, Slide, TextFrame, TextUnit,
};
use crate::package::{self, Package, PartId, REL_NS, TextCollector};

const PML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// Groups nested deeper than this are loaded as opaque shapes.
pub const MAX_GROUP_DEPTH: usize = 64;

fn pml<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    package::child(node, PML_NS, name)
}

fn dml<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    package::child(node, DML_NS, name)
}

fn is_dml(node: Node, name: &str) -> bool {
    package::is_element(node, DML_NS, name)
}

pub fn load(package: &Package) -> Result<Presentation, PackageError> {
    let main = package.main_part("ppt/presentation.xml")?;
    let rels = package.relationships(&main)?;
    let (_, content) = package.xml(&main)?;
    let xml = roxmltree::Document::parse(content)?;

    let mut presentation = Presentation::default();
    let Some(slide_ids) = pml(xml.root_element(), "sldIdLst") else {
        return Ok(presentation);
    };
    for sld_id in slide_ids.children().filter(|n| package::is_element(*n, PML_NS, "sldId")) {
        let target = sld_id
            .attribute((REL_NS, "id"))
            .and_then(|id| rels.iter().find(|r| r.id == id))
            .map(|r| r.target.as_str())
            .ok_or_else(|| PackageError::Malformed("slide id without target".into()))?;
        presentation.slides.push(load_slide(package, target)?);
    }

    log::debug!("{main}: {} slides", presentation.slides.len());
    Ok(presentation)
}

fn load_slide(package: &Package, name: &str) -> Result<Slide, PackageError> {
    let (part, content) = package.xml(name)?;
    let xml = roxmltree::Document::parse(content)?;
    let shapes = pml(xml.root_element(), "cSld")
        .and_then(|c| pml(c, "spTree"))
        .map(|tree| parse_shapes(tree, part, 0))
        .unwrap_or_default();
    Ok(Slide { shapes })
}

fn parse_shapes(tree: Node, part: PartId, depth: usize) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for node in tree.children() {
        if !node.is_element() || node.tag_name().namespace() != Some(PML_NS) {
            continue;
        }
        let shape = match node.tag_name().name() {
            "sp" => {
                let kind = match pml(node, "txBody") {
                    Some(body) => ShapeKind::TextFrame(parse_text_frame(body, part)),
                    None => ShapeKind::Other,
                };
                Shape::new(shape_name(node, "nvSpPr"), kind)
            }
            "grpSp" => {
                let name = shape_name(node, "nvGrpSpPr");
                if depth >= MAX_GROUP_DEPTH {
                    log::warn!("group {name:?} nested deeper than {MAX_GROUP_DEPTH}, leaving it as is");
                    Shape::new(name, ShapeKind::Other)
                } else {
                    Shape::new(name, ShapeKind::Group(parse_shapes(node, part, depth + 1)))
                }
            }
            "graphicFrame" => {
                let kind = dml(node, "graphic")
                    .and_then(|g| dml(g, "graphicData"))
                    .and_then(|d| dml(d, "tbl"))
                    .map(|tbl| ShapeKind::Table(parse_table(tbl, part)))
                    .unwrap_or(ShapeKind::Other);
                Shape::new(shape_name(node, "nvGraphicFramePr"), kind)
            }
            "pic" => Shape::new(shape_name(node, "nvPicPr"), ShapeKind::Other),
            "cxnSp" => Shape::new(shape_name(node, "nvCxnSpPr"), ShapeKind::Other),
            "contentPart" => Shape::new(String::new(), ShapeKind::Other),
            _ => continue,
        };
        shapes.push(shape);
    }
    shapes
}

fn shape_name(node: Node, non_visual: &str) -> String {
    pml(node, non_visual)
        .and_then(|nv| pml(nv, "cNvPr"))
        .and_then(|pr| pr.attribute("name"))
        .unwrap_or_default()
        .to_string()
}

fn parse_text_frame(body: Node, part: PartId) -> TextFrame {
    let paragraphs = body
        .children()
        .filter(|n| is_dml(*n, "p"))
        .map(|p| parse_text_paragraph(p, part))
        .collect();
    TextFrame { paragraphs }
}

fn parse_text_paragraph(p: Node, part: PartId) -> TextUnit {
    let mut text = TextCollector::new(false);
    for child in p.children() {
        // Runs and fields both carry visible text.
        if (is_dml(child, "r") || is_dml(child, "fld"))
            && let Some(t) = dml(child, "t")
        {
            text.push_text(t);
        } else if is_dml(child, "br") {
            text.push_separator('\n');
        }
    }
    text.finish(part)
}

fn parse_table(tbl: Node, part: PartId) -> ShapeTable {
    let rows = tbl
        .children()
        .filter(|n| is_dml(*n, "tr"))
        .map(|tr| ShapeRow {
            cells: tr
                .children()
                .filter(|n| is_dml(*n, "tc"))
                .map(|tc| ShapeCell {
                    text_frame: dml(tc, "txBody").map(|body| parse_text_frame(body, part)),
                })
                .collect(),
        })
        .collect();
    ShapeTable { rows }
}
