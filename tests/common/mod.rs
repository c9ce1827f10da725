#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Mutex;

use office_translate::backend::Glossary;
use office_translate::{Translate, TranslateError};
use zip::write::SimpleFileOptions;

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub const PML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub fn glossary(pairs: &[(&str, &str)]) -> Glossary {
    pairs.iter().copied().collect()
}

/// Records every string that reaches the backend, then answers from a glossary.
pub struct Spy {
    pub calls: Mutex<Vec<String>>,
    glossary: Glossary,
}

impl Spy {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Spy { calls: Mutex::new(Vec::new()), glossary: glossary(pairs) }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Translate for Spy {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.calls.lock().unwrap().push(text.to_string());
        self.glossary.translate(text)
    }
}

pub fn write_package<N: AsRef<str>>(path: &Path, parts: &[(N, String)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in parts {
        zip.start_file(name.as_ref(), SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub fn read_part(path: &Path, name: &str) -> String {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut content = String::new();
    zip.by_name(name).unwrap().read_to_string(&mut content).unwrap();
    content
}

pub fn part_names(path: &Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    zip.file_names().map(String::from).collect()
}

fn root_rels(main: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="{main}"/></Relationships>"#
    )
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}">"#
    );
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL_NS}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

// Word

pub const DOCX_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"/></w:styles>"#;

/// A paragraph with a single plain run; empty text gives an empty paragraph.
pub fn p(text: &str) -> String {
    if text.is_empty() {
        "<w:p/>".to_string()
    } else {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
    }
}

pub fn tbl(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl><w:tblPr/>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in *row {
            xml.push_str(&format!("<w:tc><w:tcPr/>{}</w:tc>", p(cell)));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

pub fn write_docx(path: &Path, body: &str) {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{WML_NS}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    write_package(
        path,
        &[
            ("_rels/.rels", root_rels("word/document.xml")),
            ("word/document.xml", document),
            ("word/styles.xml", DOCX_STYLES.to_string()),
        ],
    );
}

// Sheet

pub fn write_xlsx(path: &Path, shared: &[&str], sheets: &[(&str, &str)]) {
    let mut workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{SML_NS}" xmlns:r="{REL_NS}"><sheets>"#
    );
    let mut workbook_rels = Vec::new();
    let mut parts = vec![("_rels/.rels".to_string(), root_rels("xl/workbook.xml"))];
    let ids: Vec<String> = (1..=sheets.len()).map(|i| format!("rId{i}")).collect();
    let targets: Vec<String> = (1..=sheets.len()).map(|i| format!("worksheets/sheet{i}.xml")).collect();

    for (i, (name, data)) in sheets.iter().enumerate() {
        workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{}" r:id="{}"/>"#, i + 1, ids[i]));
        workbook_rels.push((ids[i].as_str(), "worksheet", targets[i].as_str()));
        parts.push((
            format!("xl/{}", targets[i]),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{SML_NS}"><sheetData>{data}</sheetData></worksheet>"#
            ),
        ));
    }
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push(("rIdSst", "sharedStrings", "sharedStrings.xml"));

    let mut sst = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="{SML_NS}" count="{0}" uniqueCount="{0}">"#,
        shared.len()
    );
    for s in shared {
        sst.push_str(&format!("<si><t>{s}</t></si>"));
    }
    sst.push_str("</sst>");

    parts.push(("xl/workbook.xml".to_string(), workbook));
    parts.push(("xl/_rels/workbook.xml.rels".to_string(), rels(&workbook_rels)));
    parts.push(("xl/sharedStrings.xml".to_string(), sst));
    write_package(path, &parts);
}

// Slides

pub fn sp(name: &str, paragraphs: &[&str]) -> String {
    let mut body = String::new();
    for text in paragraphs {
        if text.is_empty() {
            body.push_str(r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#);
        } else {
            body.push_str(&format!(
                r#"<a:p><a:r><a:rPr lang="en-US" b="1"/><a:t>{text}</a:t></a:r></a:p>"#
            ));
        }
    }
    sp_with_body(name, &body)
}

/// A text shape around raw `a:p` markup.
pub fn sp_with_body(name: &str, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

pub fn grp(name: &str, children: &str) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="3" name="{name}"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{children}</p:grpSp>"#
    )
}

pub fn pic(name: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="{name}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr/></p:pic>"#
    )
}

pub fn table_frame(name: &str, rows: &[&[&str]]) -> String {
    let mut xml = format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="5" name="{name}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblGrid/>"#
    );
    for row in rows {
        xml.push_str(r#"<a:tr h="370840">"#);
        for cell in *row {
            xml.push_str(&format!(
                r#"<a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>{cell}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>"#
            ));
        }
        xml.push_str("</a:tr>");
    }
    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    xml
}

pub fn write_pptx(path: &Path, slides: &[&str]) {
    let mut presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="{DML_NS}" xmlns:r="{REL_NS}" xmlns:p="{PML_NS}"><p:sldIdLst>"#
    );
    let mut parts = vec![("_rels/.rels".to_string(), root_rels("ppt/presentation.xml"))];
    let ids: Vec<String> = (1..=slides.len()).map(|i| format!("rId{}", i + 1)).collect();
    let targets: Vec<String> = (1..=slides.len()).map(|i| format!("slides/slide{i}.xml")).collect();
    let mut presentation_rels = Vec::new();

    for (i, shapes) in slides.iter().enumerate() {
        presentation.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, ids[i]));
        presentation_rels.push((ids[i].as_str(), "slide", targets[i].as_str()));
        parts.push((
            format!("ppt/{}", targets[i]),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="{DML_NS}" xmlns:r="{REL_NS}" xmlns:p="{PML_NS}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sld>"#
            ),
        ));
    }
    presentation.push_str("</p:sldIdLst></p:presentation>");

    parts.push(("ppt/presentation.xml".to_string(), presentation));
    parts.push(("ppt/_rels/presentation.xml.rels".to_string(), rels(&presentation_rels)));
    write_package(path, &parts);
}
