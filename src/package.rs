//! In-memory OOXML package.
//!
//! Every zip entry is kept as read. Saving copies all bytes verbatim except
//! the text elements of units whose text was replaced.

use std::collections::HashMap;
use std::io::{Read, Seek, Write};
use std::ops::Range;
use std::path::Path;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::PackageError;
use crate::model::TextUnit;

const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PartId(usize);

/// Byte range of one text element (`<w:t>`, `<t>`, `<a:t>`) in its part.
#[derive(Clone, Debug)]
pub(crate) struct Slot {
    range: Range<usize>,
    preserve_space: bool,
}

impl Slot {
    /// `node` must be a leaf element: its content is text only.
    fn new(node: roxmltree::Node, preserve_space: bool) -> Self {
        let source = node.document().input_text();
        let start = node.range().start;
        Slot { range: start..leaf_element_end(source, start), preserve_space }
    }
}

/// End of the leaf element starting at `start`, past `/>` or its end tag.
fn leaf_element_end(source: &str, start: usize) -> usize {
    let rest = &source[start..];
    let Some(tag_end) = rest.find('>') else {
        return source.len();
    };
    if rest[..tag_end].ends_with('/') {
        return start + tag_end + 1;
    }
    let Some(close) = rest[tag_end..].find("</") else {
        return source.len();
    };
    let close = start + tag_end + close;
    source[close..].find('>').map_or(source.len(), |i| close + i + 1)
}

/// Where a unit's text lives: its text elements, grouped by the tab and
/// break elements that separate them. Separators are never rewritten.
#[derive(Clone, Debug)]
pub(crate) struct Anchor {
    part: PartId,
    groups: Vec<Vec<Slot>>,
}

/// Builds a unit's text and anchor from its content in document order.
pub(crate) struct TextCollector {
    text: String,
    groups: Vec<Vec<Slot>>,
    preserve_space: bool,
}

impl TextCollector {
    pub(crate) fn new(preserve_space: bool) -> Self {
        TextCollector { text: String::new(), groups: vec![Vec::new()], preserve_space }
    }

    pub(crate) fn push_text(&mut self, node: roxmltree::Node) {
        if let Some(t) = node.text() {
            self.text.push_str(t);
        }
        let slot = Slot::new(node, self.preserve_space);
        if let Some(group) = self.groups.last_mut() {
            group.push(slot);
        }
    }

    /// A tab or line break element, rendered as `\t` or `\n`.
    pub(crate) fn push_separator(&mut self, separator: char) {
        self.text.push(separator);
        self.groups.push(Vec::new());
    }

    pub(crate) fn finish(self, part: PartId) -> TextUnit {
        TextUnit::anchored(self.text, Anchor { part, groups: self.groups })
    }
}

/// Splits `text` at tabs and newlines into one string per group. Surplus
/// segments join the last group; text aimed at a group without text
/// elements joins its nearest neighbour.
fn split_across_groups(text: &str, groups: &[Vec<Slot>]) -> Vec<String> {
    if groups.len() <= 1 {
        return vec![text.to_string()];
    }
    let last = groups.len() - 1;
    let mut buckets = vec![String::new(); groups.len()];
    for (i, segment) in text.split(['\t', '\n']).enumerate() {
        append_words(&mut buckets[i.min(last)], segment);
    }

    for i in 0..groups.len() {
        if !groups[i].is_empty() || buckets[i].is_empty() {
            continue;
        }
        let moved = std::mem::take(&mut buckets[i]);
        if let Some(prev) = (0..i).rev().find(|&j| !groups[j].is_empty()) {
            append_words(&mut buckets[prev], &moved);
        } else if let Some(next) = (i + 1..groups.len()).find(|&j| !groups[j].is_empty()) {
            let rest = std::mem::replace(&mut buckets[next], moved);
            append_words(&mut buckets[next], &rest);
        }
    }
    buckets
}

fn append_words(bucket: &mut String, words: &str) {
    if words.is_empty() {
        return;
    }
    if !bucket.is_empty() {
        bucket.push(' ');
    }
    bucket.push_str(words);
}

#[derive(Debug)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

pub struct Package {
    entries: Vec<Entry>,
}

struct Edit<'a> {
    slot: &'a Slot,
    text: String,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self, PackageError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, PackageError> {
        let mut zip = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }
        log::debug!("opened package with {} entries", entries.len());
        Ok(Package { entries })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Returns the part's id and its content as UTF-8 XML.
    pub(crate) fn xml(&self, name: &str) -> Result<(PartId, &str), PackageError> {
        let (idx, entry) = self
            .entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.name == name && !e.is_dir)
            .ok_or_else(|| PackageError::MissingPart(name.to_string()))?;
        let text = std::str::from_utf8(&entry.data)
            .map_err(|e| PackageError::Malformed(format!("{name} is not UTF-8: {e}")))?;
        Ok((PartId(idx), text.strip_prefix('\u{feff}').unwrap_or(text)))
    }

    /// Relationships declared by `part`; an absent `.rels` file means none.
    pub(crate) fn relationships(&self, part: &str) -> Result<Vec<Relationship>, PackageError> {
        let rels_name = rels_path(part);
        if !self.contains(&rels_name) {
            return Ok(Vec::new());
        }
        let (_, content) = self.xml(&rels_name)?;
        let xml = roxmltree::Document::parse(content)?;

        let mut rels = Vec::new();
        for node in xml.root_element().children() {
            if node.tag_name().name() != "Relationship"
                || node.tag_name().namespace() != Some(PKG_REL_NS)
            {
                continue;
            }
            if node.attribute("TargetMode") == Some("External") {
                continue;
            }
            let (Some(id), Some(rel_type), Some(target)) = (
                node.attribute("Id"),
                node.attribute("Type"),
                node.attribute("Target"),
            ) else {
                continue;
            };
            rels.push(Relationship {
                id: id.to_string(),
                rel_type: rel_type.to_string(),
                target: resolve_target(part, target),
            });
        }
        Ok(rels)
    }

    /// Target of the first relationship of `part` whose type ends with `/kind`.
    pub(crate) fn related(&self, part: &str, kind: &str) -> Result<Option<String>, PackageError> {
        let suffix = format!("/{kind}");
        Ok(self
            .relationships(part)?
            .into_iter()
            .find(|r| r.rel_type.ends_with(&suffix))
            .map(|r| r.target))
    }

    /// The package's main part (`word/document.xml`, `xl/workbook.xml`, ...).
    pub(crate) fn main_part(&self, fallback: &str) -> Result<String, PackageError> {
        Ok(self
            .related("", "officeDocument")?
            .unwrap_or_else(|| fallback.to_string()))
    }

    /// Writes the package with the text of every modified unit spliced in.
    pub fn write<'u, W, I>(&self, units: I, writer: W) -> Result<(), PackageError>
    where
        W: Write + Seek,
        I: IntoIterator<Item = &'u TextUnit>,
    {
        let mut edits: HashMap<PartId, Vec<Edit>> = HashMap::new();
        for unit in units {
            if !unit.is_modified() {
                continue;
            }
            let Some(anchor) = unit.anchor() else {
                continue;
            };
            let part_edits = edits.entry(anchor.part).or_default();
            let texts = split_across_groups(unit.text(), &anchor.groups);
            for (group, text) in anchor.groups.iter().zip(texts) {
                // The first element of a group takes its text, the rest are emptied.
                for (i, slot) in group.iter().enumerate() {
                    let text = if i == 0 { text.clone() } else { String::new() };
                    part_edits.push(Edit { slot, text });
                }
            }
        }

        let mut patched: HashMap<PartId, String> = HashMap::new();
        for (part, part_edits) in edits {
            let (_, source) = self.xml(&self.entries[part.0].name)?;
            log::debug!("rewriting {} text elements in {}", part_edits.len(), self.entries[part.0].name);
            patched.insert(part, splice(source, part_edits));
        }

        let mut zip = zip::ZipWriter::new(writer);
        for (idx, entry) in self.entries.iter().enumerate() {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            zip.start_file(entry.name.as_str(), options)?;
            match patched.get(&PartId(idx)) {
                Some(xml) => zip.write_all(xml.as_bytes())?,
                None => zip.write_all(&entry.data)?,
            }
        }
        zip.finish()?;
        Ok(())
    }

    /// Saves to `path` through a temporary file in the same directory, so a
    /// failed save never leaves a partial archive behind.
    pub fn save<'u, I>(&self, units: I, path: &Path) -> Result<(), PackageError>
    where
        I: IntoIterator<Item = &'u TextUnit>,
    {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.write(units, &mut tmp)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }
}

fn splice(source: &str, mut edits: Vec<Edit>) -> String {
    // Stable sort keeps the first unit bound to a shared slot in front.
    edits.sort_by_key(|e| e.slot.range.start);
    edits.dedup_by_key(|e| e.slot.range.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        let Range { start, end } = edit.slot.range;
        if start < cursor || end > source.len() {
            log::warn!("skipping overlapping text element at byte {start}");
            continue;
        }
        out.push_str(&source[cursor..start]);
        render_text_element(&mut out, &source[start..end], &edit.text, edit.slot.preserve_space);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

fn render_text_element(out: &mut String, original: &str, text: &str, preserve_space: bool) {
    let qname = original
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .filter(|q| !q.is_empty())
        .unwrap_or("t");
    out.push('<');
    out.push_str(qname);
    if preserve_space {
        out.push_str(" xml:space=\"preserve\"");
    }
    out.push('>');
    escape_into(out, text);
    out.push_str("</");
    out.push_str(qname);
    out.push('>');
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' | '\n' | '\r' => out.push(c),
            // not representable in XML 1.0
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
}

fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Whether `node` is the element `ns:name`.
pub(crate) fn is_element(node: roxmltree::Node, ns: &str, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(ns)
}

pub(crate) fn child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    ns: &str,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| is_element(*n, ns, name))
}
