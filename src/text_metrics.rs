use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONTS: Lazy<Mutex<FontCatalog>> = Lazy::new(|| Mutex::new(FontCatalog::new()));

/// Advance width of `text` in the first installed family of `font_family`.
///
/// Returns `None` when no font matches, so callers can fall back to estimates.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut catalog = FONTS.lock().ok()?;
    catalog.measure(text, font_size, font_family)
}

struct FontCatalog {
    db: Database,
    system_loaded: bool,
    faces: HashMap<String, Option<Metrics>>,
}

impl FontCatalog {
    fn new() -> Self {
        Self {
            db: Database::new(),
            system_loaded: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = family_key(font_family);
        if !self.faces.contains_key(&key) {
            let metrics = self.load(font_family);
            self.faces.insert(key.clone(), metrics);
        }
        let metrics = self.faces.get_mut(&key)?.as_mut()?;
        Some(metrics.width(text, font_size))
    }

    fn load(&mut self, font_family: &str) -> Option<Metrics> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                "monospace" | "ui-monospace" => Family::Monospace,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.system_loaded {
            self.db.load_system_fonts();
            self.system_loaded = true;
        }
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| Metrics::parse(data.to_vec(), index))
            .flatten()
    }
}

/// Glyph advances of one face. ASCII advances are read up front; other
/// characters are looked up on demand and remembered.
struct Metrics {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii: [Option<u16>; 128],
    others: HashMap<char, Option<u16>>,
}

impl Metrics {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1) as f32;
        let mut ascii = [None; 128];
        for (byte, slot) in ascii.iter_mut().enumerate() {
            *slot = advance(&face, byte as u8 as char);
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii,
            others: HashMap::new(),
        })
    }

    fn width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !ch.is_ascii() && !self.others.contains_key(ch))
            .collect();
        if !missing.is_empty()
            && let Ok(face) = Face::parse(&self.data, self.index)
        {
            for ch in missing {
                self.others.insert(ch, advance(&face, ch));
            }
        }

        text.chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                let units = if ch.is_ascii() {
                    self.ascii[ch as usize]
                } else {
                    self.others.get(&ch).copied().flatten()
                };
                units.map_or(fallback, |units| units as f32 * scale)
            })
            .sum()
    }
}

fn advance(face: &Face<'_>, ch: char) -> Option<u16> {
    let glyph = face.glyph_index(ch)?;
    face.glyph_hor_advance(glyph).filter(|advance| *advance > 0)
}

fn family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
