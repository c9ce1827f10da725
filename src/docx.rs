use roxmltree::Node;

use crate::error::PackageError;
use crate::model::{Block, Cell, Row, Table, TextUnit, WordDocument};
use crate::package::{self, Package, PartId, TextCollector};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn wml<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    package::child(node, WML_NS, name)
}

fn is_wml(node: Node, name: &str) -> bool {
    package::is_element(node, WML_NS, name)
}

pub fn load(package: &Package) -> Result<WordDocument, PackageError> {
    let main = package.main_part("word/document.xml")?;
    let (part, content) = package.xml(&main)?;
    let xml = roxmltree::Document::parse(content)?;
    let root = xml.root_element();

    let body = wml(root, "body").ok_or_else(|| PackageError::Malformed("missing w:body".into()))?;
    let doc = WordDocument { body: parse_blocks(body, part) };

    log::debug!(
        "{main}: {} paragraphs, {} tables",
        doc.paragraphs().count(),
        doc.tables().count()
    );
    Ok(doc)
}

fn parse_blocks(container: Node, part: PartId) -> Vec<Block> {
    container
        .children()
        .filter_map(|node| {
            if is_wml(node, "p") {
                Some(Block::Paragraph(parse_paragraph(node, part)))
            } else if is_wml(node, "tbl") {
                Some(Block::Table(parse_table(node, part)))
            } else {
                None
            }
        })
        .collect()
}

fn parse_table(tbl: Node, part: PartId) -> Table {
    let rows = tbl
        .children()
        .filter(|n| is_wml(*n, "tr"))
        .map(|tr| Row {
            cells: tr
                .children()
                .filter(|n| is_wml(*n, "tc"))
                .map(|tc| Cell { blocks: parse_blocks(tc, part) })
                .collect(),
        })
        .collect();
    Table { rows }
}

fn parse_paragraph(para: Node, part: PartId) -> TextUnit {
    let mut text = TextCollector::new(true);
    collect_run_text(para, &mut text);
    text.finish(part)
}

// Runs may sit inside hyperlinks, insertions, smart tags or content controls.
// Text boxes carry their own paragraphs and are not part of this one.
fn collect_run_text(node: Node, out: &mut TextCollector) {
    for child in node.children() {
        if !child.is_element() || child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => out.push_text(child),
            "tab" => out.push_separator('\t'),
            "cr" => out.push_separator('\n'),
            // Page and column breaks end no line of text.
            "br" => {
                if matches!(child.attribute((WML_NS, "type")), None | Some("textWrapping")) {
                    out.push_separator('\n');
                }
            }
            "p" | "pPr" | "rPr" | "del" | "drawing" | "pict" | "object" | "txbxContent" => {}
            _ => collect_run_text(child, out),
        }
    }
}
