//! PPTX extraction: slides are XML parts inside a zip archive. Each slide
//! becomes at most one chunk composed of a title section, bullet key
//! points, and any remaining body text.

use std::io::Read;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use super::LIST_LINE;
use super::error::DocumentError;
use super::types::{Chunk, ChunkKind};

static ENUMERATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("valid regex"));

pub fn extract(source_name: &str, bytes: &[u8]) -> Result<Vec<Chunk>, DocumentError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| DocumentError::parse(source_name, e))?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .map(str::to_owned)
        .collect();
    slide_names.sort_by_key(|name| slide_ordinal(name));

    let mut chunks = Vec::new();
    for (i, name) in slide_names.iter().enumerate() {
        let number = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let mut xml = String::new();
        let mut file = archive
            .by_name(name)
            .map_err(|e| DocumentError::parse(source_name, e))?;
        file.read_to_string(&mut xml)
            .map_err(|e| DocumentError::parse(source_name, e))?;

        match parse_slide(&xml) {
            Some(slide) => chunks.push(slide.into_chunk(source_name, number)),
            None => tracing::debug!(source = source_name, slide = number, "empty slide skipped"),
        }
    }
    Ok(chunks)
}

fn slide_ordinal(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

#[derive(Debug, Default)]
struct Slide {
    title: Option<String>,
    bullets: Vec<String>,
    body: Vec<String>,
}

impl Slide {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.bullets.is_empty() && self.body.is_empty()
    }

    fn into_chunk(self, source_name: &str, number: u32) -> Chunk {
        let mut sections = Vec::new();
        if let Some(title) = &self.title {
            sections.push(format!("**Title:** {title}"));
        }
        if !self.bullets.is_empty() {
            let points = self
                .bullets
                .iter()
                .map(|b| format!("• {b}"))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("**Key Points:**\n{points}"));
        }
        if !self.body.is_empty() {
            sections.push(format!("**Additional Content:**\n{}", self.body.join("\n")));
        }

        let has_bullets = !self.bullets.is_empty();
        Chunk::new(
            sections.join("\n"),
            source_name,
            ChunkKind::Slide {
                number,
                title: self.title,
                has_bullets,
            },
        )
    }
}

/// Walk one slide's XML. Shapes whose placeholder type is a title feed the
/// title section; in other shapes, each `<a:p>` paragraph is classified as
/// a bullet or plain body text. Returns `None` for slides with no text.
fn parse_slide(xml: &str) -> Option<Slide> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut slide = Slide::default();
    let mut in_title_shape = false;
    let mut paragraph = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                if e.local_name().as_ref() == b"ph" {
                    let is_title = e.attributes().flatten().any(|attr| {
                        attr.key.local_name().as_ref() == b"type"
                            && matches!(attr.value.as_ref(), b"title" | b"ctrTitle")
                    });
                    if is_title {
                        in_title_shape = true;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Ok(text) = e.unescape() {
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    let text = paragraph.trim().to_owned();
                    paragraph.clear();
                    if text.is_empty() {
                        continue;
                    }
                    if in_title_shape {
                        if slide.title.is_none() {
                            slide.title = Some(text);
                        }
                    } else if let Some(stripped) = strip_bullet(&text) {
                        slide.bullets.push(stripped);
                    } else {
                        slide.body.push(text);
                    }
                }
                b"sp" => in_title_shape = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    if slide.is_empty() { None } else { Some(slide) }
}

/// A paragraph counts as a bullet when it leads with a bullet glyph or an
/// enumeration. The leading glyph is stripped so rendering can re-bullet
/// uniformly.
fn strip_bullet(text: &str) -> Option<String> {
    if !LIST_LINE.is_match(text) {
        return None;
    }
    let stripped = if ENUMERATED.is_match(text) {
        ENUMERATED.replace(text, "").into_owned()
    } else {
        text.trim_start_matches(['-', '•', '*', '·', '○'])
            .trim_start()
            .to_owned()
    };
    if stripped.is_empty() {
        None
    } else {
        Some(stripped)
    }
}
