//! PDF extraction over lopdf content streams.
//!
//! Each `BT`..`ET` text block becomes its own chunk, so retrieval stays at
//! paragraph granularity. Lines are tagged with whether the active font is
//! monospace; monospace runs are rendered as fenced code blocks, columnar
//! runs become table chunks, and `Do` references to image XObjects become
//! placeholder chunks.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use super::LIST_LINE;
use super::error::DocumentError;
use super::types::{Chunk, ChunkKind, IMAGE_PLACEHOLDER};

#[derive(Debug)]
struct Line {
    text: String,
    mono: bool,
}

pub fn extract(source_name: &str, bytes: &[u8]) -> Result<Vec<Chunk>, DocumentError> {
    let doc = Document::load_mem(bytes).map_err(|e| DocumentError::parse(source_name, e))?;

    let mut chunks = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        match extract_page(&doc, page_id, page_num, source_name) {
            Ok(mut page_chunks) => chunks.append(&mut page_chunks),
            Err(reason) => {
                tracing::warn!(source = source_name, page = page_num, %reason, "skipping page");
            }
        }
    }
    Ok(chunks)
}

fn extract_page(
    doc: &Document,
    page_id: ObjectId,
    page_num: u32,
    source_name: &str,
) -> Result<Vec<Chunk>, lopdf::Error> {
    let content_bytes = doc.get_page_content(page_id)?;
    let content = Content::decode(&content_bytes)?;

    let mut blocks: Vec<Vec<Line>> = Vec::new();
    let mut block: Vec<Line> = Vec::new();
    let mut current = String::new();
    let mut mono = false;
    let mut images = 0u32;

    let flush_line = |current: &mut String, block: &mut Vec<Line>, mono: bool| {
        let text = current.trim().to_owned();
        current.clear();
        if !text.is_empty() {
            block.push(Line { text, mono });
        }
    };

    for op in &content.operations {
        match op.operator.as_str() {
            // block boundary: a missing ET still closes the prior block
            "BT" | "ET" => {
                flush_line(&mut current, &mut block, mono);
                if !block.is_empty() {
                    blocks.push(std::mem::take(&mut block));
                }
            }
            "Td" | "TD" | "T*" => flush_line(&mut current, &mut block, mono),
            "Tf" => {
                flush_line(&mut current, &mut block, mono);
                if let Some(Object::Name(name)) = op.operands.first() {
                    mono = is_mono_font(doc, page_id, name);
                }
            }
            "Tj" => {
                if let Some(Object::String(s, _)) = op.operands.first() {
                    current.push_str(&decode_string(s));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        if let Object::String(s, _) = item {
                            current.push_str(&decode_string(s));
                        }
                    }
                }
            }
            "'" => {
                flush_line(&mut current, &mut block, mono);
                if let Some(Object::String(s, _)) = op.operands.first() {
                    current.push_str(&decode_string(s));
                }
            }
            "\"" => {
                flush_line(&mut current, &mut block, mono);
                if let Some(Object::String(s, _)) = op.operands.get(2) {
                    current.push_str(&decode_string(s));
                }
            }
            "Do" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    if is_image_xobject(doc, page_id, name) {
                        images += 1;
                    }
                }
            }
            _ => {}
        }
    }
    flush_line(&mut current, &mut block, mono);
    if !block.is_empty() {
        blocks.push(block);
    }

    Ok(assemble_page(&blocks, images, page_num, source_name))
}

fn assemble_page(
    blocks: &[Vec<Line>],
    images: u32,
    page_num: u32,
    source_name: &str,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for block in blocks {
        chunks.extend(block_chunks(block, page_num, source_name));
    }
    for _ in 0..images {
        chunks.push(Chunk::new(
            IMAGE_PLACEHOLDER,
            source_name,
            ChunkKind::Image { number: page_num },
        ));
    }
    chunks
}

/// One text block becomes one chunk, except columnar runs of two or more
/// lines which split out into table chunks of their own.
fn block_chunks(lines: &[Line], page_num: u32, source_name: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut body: Vec<&Line> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if is_columnar(&lines[i].text) {
            let mut j = i;
            while j < lines.len() && is_columnar(&lines[j].text) {
                j += 1;
            }
            if j - i >= 2 {
                let table = lines[i..j]
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                chunks.push(Chunk::new(
                    format!("[Table]\n{table}"),
                    source_name,
                    ChunkKind::Table { number: page_num },
                ));
                i = j;
                continue;
            }
        }
        body.push(&lines[i]);
        i += 1;
    }

    let text = render_body(&body);
    if !text.is_empty() {
        // Block text precedes the tables it surrounds.
        chunks.insert(
            0,
            Chunk::new(text, source_name, ChunkKind::Page { number: page_num }),
        );
    }
    chunks
}

/// Prose lines are joined with spaces unless the block carries list items,
/// which must keep their line structure. Monospace runs are fenced.
fn render_body(lines: &[&Line]) -> String {
    let sep = if lines
        .iter()
        .any(|l| !l.mono && LIST_LINE.is_match(&l.text))
    {
        "\n"
    } else {
        " "
    };

    let mut pieces: Vec<String> = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].mono {
            let mut j = i;
            while j < lines.len() && lines[j].mono {
                j += 1;
            }
            let code = lines[i..j]
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            pieces.push(format!("```\n{code}\n```"));
            i = j;
        } else {
            let mut prose: Vec<&str> = Vec::new();
            let mut j = i;
            while j < lines.len() && !lines[j].mono {
                prose.push(lines[j].text.as_str());
                j += 1;
            }
            pieces.push(prose.join(sep));
            i = j;
        }
    }
    pieces.join("\n").trim().to_owned()
}

fn is_columnar(line: &str) -> bool {
    line.contains('\t') || line.contains("   ")
}

/// PDF strings are UTF-16BE when they carry a BOM, otherwise close enough
/// to Latin-1 for the standard encodings.
fn decode_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn is_mono_font(doc: &Document, page_id: ObjectId, font_key: &[u8]) -> bool {
    let Some(resources) = page_resources(doc, page_id) else {
        return false;
    };
    let Some(font) = lookup_dict(doc, resources, b"Font", font_key) else {
        return false;
    };
    match font.get(b"BaseFont") {
        Ok(Object::Name(base)) => {
            let name = String::from_utf8_lossy(base);
            name.contains("Mono") || name.contains("Courier")
        }
        _ => false,
    }
}

fn is_image_xobject(doc: &Document, page_id: ObjectId, key: &[u8]) -> bool {
    let Some(resources) = page_resources(doc, page_id) else {
        return false;
    };
    let Ok(entry) = resources.get(b"XObject") else {
        return false;
    };
    let Some(xobjects) = deref_dict(doc, entry) else {
        return false;
    };
    let Ok(obj) = xobjects.get(key) else {
        return false;
    };
    let stream = match deref(doc, obj) {
        Some(Object::Stream(s)) => s,
        _ => return false,
    };
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image")
}

/// Resolve the `/Resources` for a page, walking the `/Parent` chain when
/// the page node inherits them.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    for _ in 0..16 {
        if let Ok(entry) = dict.get(b"Resources") {
            return deref_dict(doc, entry);
        }
        match dict.get(b"Parent") {
            Ok(parent) => dict = deref_dict(doc, parent)?,
            Err(_) => return None,
        }
    }
    None
}

/// `resources[group][key]` as a dictionary, following references.
fn lookup_dict<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    group: &[u8],
    key: &[u8],
) -> Option<&'a Dictionary> {
    let group = deref_dict(doc, resources.get(group).ok()?)?;
    deref_dict(doc, group.get(key).ok()?)
}

fn deref<'a>(doc: &'a Document, mut obj: &'a Object) -> Option<&'a Object> {
    for _ in 0..16 {
        match obj {
            Object::Reference(id) => obj = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

fn deref_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match deref(doc, obj)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}
