//! Bitmap font renderer.
//!
//! Glyphs come from a 256-frame sprite sheet plus a metrics record
//! (advances, kerning, ascent). Text supports the inline tag set used by map
//! labels: `<br>`, `<lt>`, `<gt>`, `<col=RRGGBB>`/`</col>`, `<str[=...]>`/
//! `</str>`, `<u[=...]>`/`</u>`, `<shad[=...]>`/`</shad>` and `<img=N>` for
//! mod icons. Line breaking wraps on spaces and keeps hyphens.

use crate::provider::FontMetrics;
use crate::raster::Raster;
use crate::sprite::{ModIconSprites, SpriteSheet};

pub struct Font {
    advances: Vec<i32>,
    kerning: Option<Vec<i8>>,
    pub ascent: i32,
    pub max_ascent: i32,
    pub max_descent: i32,
    left_bearings: Vec<i32>,
    top_bearings: Vec<i32>,
    widths: Vec<i32>,
    heights: Vec<i32>,
    glyphs: Vec<Vec<i32>>,
    mod_icons: ModIconSprites,

    colour: i32,
    previous_colour: i32,
    shadow: i32,
    previous_shadow: i32,
    strike: i32,
    underline: i32,
    justification_total: i32,
    justification_current: i32,
}

impl Font {
    /// Build a font from a 256-glyph sprite sheet and its metrics. Returns
    /// `None` when the sheet does not carry a full glyph set.
    pub fn new(metrics: FontMetrics, sheet: &SpriteSheet, mod_icons: ModIconSprites) -> Option<Self> {
        if sheet.frames.len() < 256 || metrics.advances.len() < 256 {
            return None;
        }
        let mut left_bearings = vec![0i32; 256];
        let mut top_bearings = vec![0i32; 256];
        let mut widths = vec![0i32; 256];
        let mut heights = vec![0i32; 256];
        let mut glyphs = Vec::with_capacity(256);
        for (index, frame) in sheet.frames.iter().take(256).enumerate() {
            left_bearings[index] = frame.x_offset;
            top_bearings[index] = frame.y_offset;
            widths[index] = frame.inner_width;
            heights[index] = frame.inner_height;
            glyphs.push(frame.pixels.clone());
        }
        let ascent = metrics.ascent;
        let mut highest = i32::MAX;
        let mut lowest = i32::MIN;
        for index in 0..256 {
            if top_bearings[index] < highest && heights[index] != 0 {
                highest = top_bearings[index];
            }
            if top_bearings[index] + heights[index] > lowest {
                lowest = top_bearings[index] + heights[index];
            }
        }
        Some(Self {
            advances: metrics.advances,
            kerning: metrics.kerning,
            ascent,
            max_ascent: ascent - highest,
            max_descent: lowest - ascent,
            left_bearings,
            top_bearings,
            widths,
            heights,
            glyphs,
            mod_icons,
            colour: -1,
            previous_colour: -1,
            shadow: -1,
            previous_shadow: -1,
            strike: -1,
            underline: -1,
            justification_total: 0,
            justification_current: 0,
        })
    }

    fn reset(&mut self, colour: i32, shadow: i32) {
        self.strike = -1;
        self.underline = -1;
        self.previous_shadow = shadow;
        self.shadow = shadow;
        self.previous_colour = colour;
        self.colour = colour;
        self.justification_total = 0;
        self.justification_current = 0;
    }

    fn char_width(&self, ch: char) -> i32 {
        let mapped = if ch as u32 == 160 { b' ' } else { char_to_cp1252(ch) };
        self.advances[mapped as usize]
    }

    fn kern(&self, previous: i32, current: u8) -> i32 {
        match (&self.kerning, previous) {
            (Some(table), prev) if prev != -1 => {
                let index = current as usize + ((prev as usize) << 8);
                table.get(index).map(|&k| k as i32).unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Measure a string, honouring tags.
    pub fn text_width(&self, text: &str) -> i32 {
        let chars: Vec<char> = text.chars().collect();
        let mut tag_start: i32 = -1;
        let mut previous: i32 = -1;
        let mut width = 0;
        let mut index = 0usize;
        while index < chars.len() {
            let mut ch = chars[index];
            if ch == '<' {
                tag_start = index as i32;
                index += 1;
                continue;
            }
            if ch == '>' && tag_start != -1 {
                let tag: String = chars[tag_start as usize + 1..index].iter().collect();
                tag_start = -1;
                match tag.as_str() {
                    "lt" => ch = '<',
                    "gt" => ch = '>',
                    _ => {
                        if let Some(arg) = tag.strip_prefix("img=") {
                            if let Ok(icon) = arg.parse::<usize>() {
                                if let Some(sprite) = self.mod_icons.sprites.get(icon) {
                                    width += sprite.width;
                                    previous = -1;
                                }
                            }
                        }
                        index += 1;
                        continue;
                    }
                }
            }
            if ch as u32 == 160 {
                ch = ' ';
            }
            if tag_start == -1 {
                let mapped = char_to_cp1252(ch);
                width += self.advances[mapped as usize];
                width += self.kern(previous, mapped);
                previous = ch as i32 & 0xFF;
            }
            index += 1;
        }
        width
    }

    /// Count the lines `text` breaks into at the given width limit.
    pub fn line_count(&self, text: &str, max_width: i32) -> usize {
        let mut lines = Vec::new();
        self.break_lines(text, Some(&[max_width]), &mut lines)
    }

    /// Break `text` into lines, wrapping on spaces (dropped) and hyphens
    /// (kept) whenever a line exceeds its width limit; `<br>` always breaks.
    /// With `max_widths == None` only explicit breaks apply. Tags carry over
    /// into the produced lines.
    pub fn break_lines(&self, text: &str, max_widths: Option<&[i32]>, out: &mut Vec<String>) -> usize {
        out.clear();
        let chars: Vec<char> = text.chars().collect();
        let mut line_buffer: Vec<char> = Vec::with_capacity(chars.len());
        let mut width = 0i32;
        let mut start_of_line = 0usize;
        let mut last_word: i32 = -1;
        let mut width_at_word = 0i32;
        let mut word_gap = 0usize;
        let mut tag_start: i32 = -1;
        let mut previous: i32 = 0;
        for index in 0..chars.len() {
            let mut ch = chars[index];
            if ch == '<' {
                tag_start = index as i32;
                continue;
            }
            if ch == '>' && tag_start != -1 {
                let tag: String = chars[tag_start as usize + 1..index].iter().collect();
                tag_start = -1;
                line_buffer.push('<');
                line_buffer.extend(tag.chars());
                line_buffer.push('>');
                match tag.as_str() {
                    "br" => {
                        out.push(line_buffer[start_of_line..].iter().collect());
                        start_of_line = line_buffer.len();
                        width = 0;
                        last_word = -1;
                        previous = 0;
                    }
                    "lt" => {
                        width += self.char_width('<');
                        width += self.kern(previous, b'<');
                        previous = '<' as i32;
                    }
                    "gt" => {
                        width += self.char_width('>');
                        width += self.kern(previous, b'>');
                        previous = '>' as i32;
                    }
                    _ => {
                        if let Some(arg) = tag.strip_prefix("img=") {
                            if let Ok(icon) = arg.parse::<usize>() {
                                if let Some(sprite) = self.mod_icons.sprites.get(icon) {
                                    width += sprite.width;
                                    previous = 0;
                                }
                            }
                        }
                    }
                }
                ch = '\0';
            }
            if tag_start != -1 {
                continue;
            }
            if ch != '\0' {
                line_buffer.push(ch);
                width += self.char_width(ch);
                width += self.kern(previous, char_to_cp1252(ch));
                previous = ch as i32 & 0xFF;
            }
            if ch == ' ' {
                last_word = line_buffer.len() as i32;
                width_at_word = width;
                word_gap = 1;
            }
            if let Some(limits) = max_widths {
                let limit = limits[(out.len()).min(limits.len() - 1)];
                if width > limit && last_word >= 0 {
                    out.push(
                        line_buffer[start_of_line..last_word as usize - word_gap]
                            .iter()
                            .collect(),
                    );
                    start_of_line = last_word as usize;
                    last_word = -1;
                    width -= width_at_word;
                    previous = 0;
                }
            }
            if ch == '-' {
                last_word = line_buffer.len() as i32;
                width_at_word = width;
                word_gap = 0;
            }
        }
        if line_buffer.len() > start_of_line {
            out.push(line_buffer[start_of_line..].iter().collect());
        }
        out.len()
    }

    fn calculate_line_justification(&mut self, line: &str, width: i32) {
        let mut spaces = 0;
        let mut in_tag = false;
        for ch in line.chars() {
            if ch == '<' {
                in_tag = true;
            } else if ch == '>' {
                in_tag = false;
            } else if !in_tag && ch == ' ' {
                spaces += 1;
            }
        }
        if spaces > 0 {
            self.justification_total = ((width - self.text_width(line)) << 8) / spaces;
        }
    }

    /// Draw `text` wrapped into a `width` × `height` box.
    ///
    /// `horizontal`: 0 left, 1 centre, 2 right, 3 justify.
    /// `vertical`: 0 top, 1 centre, 2 bottom, 3 spread.
    /// `line_height` 0 means the font ascent. Returns the line count.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_lines(
        &mut self,
        raster: &mut Raster,
        text: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        colour: i32,
        shadow: i32,
        horizontal: i32,
        vertical: i32,
        line_height: i32,
    ) -> usize {
        self.reset(colour, shadow);
        let mut line_height = if line_height == 0 { self.ascent } else { line_height };
        let limits = [width];
        let wrap = height >= line_height + self.max_ascent + self.max_descent || height >= line_height * 2;
        let mut lines = Vec::new();
        let count = self.break_lines(text, wrap.then_some(&limits[..]), &mut lines);
        let mut vertical = vertical;
        if vertical == 3 && count == 1 {
            vertical = 1;
        }
        let span = line_height * (count as i32 - 1);
        let mut line_y = match vertical {
            0 => y + self.max_ascent,
            1 => y + (height - self.max_ascent - self.max_descent - span) / 2 + self.max_ascent,
            2 => y + height - self.max_descent - span,
            _ => {
                let padding = ((height - self.max_ascent - self.max_descent - span) / (count as i32 + 1)).max(0);
                line_height += padding;
                y + padding + self.max_ascent
            }
        };
        for (index, line) in lines.iter().enumerate() {
            match horizontal {
                0 => self.draw_string(raster, line, x, line_y),
                1 => {
                    let offset = (width - self.text_width(line)) / 2;
                    self.draw_string(raster, line, x + offset, line_y);
                }
                2 => {
                    let offset = width - self.text_width(line);
                    self.draw_string(raster, line, x + offset, line_y);
                }
                _ => {
                    if index == count - 1 {
                        self.draw_string(raster, line, x, line_y);
                    } else {
                        self.calculate_line_justification(line, width);
                        self.draw_string(raster, line, x, line_y);
                        self.justification_total = 0;
                    }
                }
            }
            line_y += line_height;
        }
        count
    }

    /// Draw one already-broken line at (x, y-of-baseline-top).
    pub fn draw_string(&mut self, raster: &mut Raster, text: &str, x: i32, y: i32) {
        let chars: Vec<char> = text.chars().collect();
        let mut x = x;
        let y = y - self.ascent;
        let mut tag_start: i32 = -1;
        let mut previous: i32 = -1;
        let mut index = 0usize;
        while index < chars.len() {
            if chars[index] == '\0' {
                index += 1;
                continue;
            }
            let mut ch = char_to_cp1252(chars[index]) as char;
            if ch == '<' {
                tag_start = index as i32;
                index += 1;
                continue;
            }
            if ch == '>' && tag_start != -1 {
                let tag: String = chars[tag_start as usize + 1..index].iter().collect();
                tag_start = -1;
                match tag.as_str() {
                    "lt" => ch = '<',
                    "gt" => ch = '>',
                    _ => {
                        if let Some(arg) = tag.strip_prefix("img=") {
                            if let Ok(icon) = arg.parse::<usize>() {
                                if let Some(sprite) = self.mod_icons.sprites.get(icon).cloned() {
                                    sprite.draw_transparent(raster, x, y + self.ascent - sprite.height);
                                    x += sprite.width;
                                    previous = -1;
                                }
                            }
                        } else {
                            self.decode_tag(&tag);
                        }
                        index += 1;
                        continue;
                    }
                }
            }
            if ch as u32 == 160 {
                ch = ' ';
            }
            if tag_start == -1 {
                let code = ch as usize & 0xFF;
                x += self.kern(previous, code as u8);
                let glyph_width = self.widths[code];
                let glyph_height = self.heights[code];
                if ch != ' ' {
                    if self.shadow != -1 {
                        draw_glyph(
                            raster,
                            &self.glyphs[code],
                            x + self.left_bearings[code] + 1,
                            y + self.top_bearings[code] + 1,
                            glyph_width,
                            glyph_height,
                            self.shadow,
                        );
                    }
                    draw_glyph(
                        raster,
                        &self.glyphs[code],
                        x + self.left_bearings[code],
                        y + self.top_bearings[code],
                        glyph_width,
                        glyph_height,
                        self.colour,
                    );
                } else if self.justification_total > 0 {
                    self.justification_current += self.justification_total;
                    x += self.justification_current >> 8;
                    self.justification_current &= 255;
                }
                let advance = self.advances[code];
                if self.strike != -1 {
                    raster.draw_horizontal_line(x, y + (self.ascent as f64 * 0.7) as i32, advance, self.strike);
                }
                if self.underline != -1 {
                    raster.draw_horizontal_line(x, y + self.ascent + 1, advance, self.underline);
                }
                x += advance;
                previous = code as i32;
            }
            index += 1;
        }
    }

    fn decode_tag(&mut self, tag: &str) {
        let parse = |s: &str| i32::from_str_radix(s, 16).ok();
        if let Some(arg) = tag.strip_prefix("col=") {
            if let Some(value) = parse(arg) {
                self.colour = value;
            }
        } else if tag == "/col" {
            self.colour = self.previous_colour;
        } else if let Some(arg) = tag.strip_prefix("str=") {
            if let Some(value) = parse(arg) {
                self.strike = value;
            }
        } else if tag == "str" {
            self.strike = 0x800000;
        } else if tag == "/str" {
            self.strike = -1;
        } else if let Some(arg) = tag.strip_prefix("u=") {
            if let Some(value) = parse(arg) {
                self.underline = value;
            }
        } else if tag == "u" {
            self.underline = 0;
        } else if tag == "/u" {
            self.underline = -1;
        } else if let Some(arg) = tag.strip_prefix("shad=") {
            if let Some(value) = parse(arg) {
                self.shadow = value;
            }
        } else if tag == "shad" {
            self.shadow = 0;
        } else if tag == "/shad" {
            self.shadow = self.previous_shadow;
        } else if tag == "br" {
            let (colour, shadow) = (self.previous_colour, self.previous_shadow);
            self.reset(colour, shadow);
        }
    }
}

/// Blit one glyph mask in a flat colour, clipped to the raster.
fn draw_glyph(raster: &mut Raster, glyph: &[i32], x: i32, y: i32, width: i32, height: i32, colour: i32) {
    let mut x = x;
    let mut y = y;
    let mut width = width;
    let mut height = height;
    let mut pos = y * raster.width as i32 + x;
    let mut stride = raster.width as i32 - width;
    let mut glyph_pos = 0i32;
    let mut glyph_stride = 0i32;
    if y < raster.min_y as i32 {
        let clipped = raster.min_y as i32 - y;
        height -= clipped;
        y = raster.min_y as i32;
        glyph_pos += clipped * width;
        pos += clipped * raster.width as i32;
    }
    if y + height > raster.max_y as i32 {
        height -= y + height - raster.max_y as i32;
    }
    if x < raster.min_x as i32 {
        let clipped = raster.min_x as i32 - x;
        width -= clipped;
        x = raster.min_x as i32;
        glyph_pos += clipped;
        pos += clipped;
        glyph_stride += clipped;
        stride += clipped;
    }
    if x + width > raster.max_x as i32 {
        let clipped = x + width - raster.max_x as i32;
        width -= clipped;
        glyph_stride += clipped;
        stride += clipped;
    }
    if width <= 0 || height <= 0 {
        return;
    }
    for _ in 0..height {
        for _ in 0..width {
            if glyph[glyph_pos as usize] != 0 {
                raster.pixels[pos as usize] = colour;
            }
            glyph_pos += 1;
            pos += 1;
        }
        pos += stride;
        glyph_pos += glyph_stride;
    }
}

/// Map a char to its CP1252 byte, `?` for anything unmappable.
pub fn char_to_cp1252(ch: char) -> u8 {
    match ch as u32 {
        1..=127 | 160..=255 => ch as u32 as u8,
        8364 => 0x80,
        8218 => 0x82,
        402 => 0x83,
        8222 => 0x84,
        8230 => 0x85,
        8224 => 0x86,
        8225 => 0x87,
        710 => 0x88,
        8240 => 0x89,
        352 => 0x8A,
        8249 => 0x8B,
        338 => 0x8C,
        381 => 0x8E,
        8216 => 0x91,
        8217 => 0x92,
        8220 => 0x93,
        8221 => 0x94,
        8226 => 0x95,
        8211 => 0x96,
        8212 => 0x97,
        732 => 0x98,
        8482 => 0x99,
        353 => 0x9A,
        8250 => 0x9B,
        339 => 0x9C,
        382 => 0x9E,
        376 => 0x9F,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::SpriteFrame;

    fn fixed_width_font(advance: i32) -> Font {
        // 256 glyph frames, each a 2x2 solid block.
        let frames: Vec<SpriteFrame> = (0..256)
            .map(|_| SpriteFrame {
                x_offset: 0,
                y_offset: 0,
                inner_width: 2,
                inner_height: 2,
                pixels: vec![1; 4],
            })
            .collect();
        let sheet = SpriteSheet {
            width: 2,
            height: 2,
            frames,
        };
        let metrics = FontMetrics {
            advances: vec![advance; 256],
            kerning: None,
            ascent: 8,
        };
        Font::new(metrics, &sheet, ModIconSprites { sprites: Vec::new() }).unwrap()
    }

    #[test]
    fn width_counts_advances() {
        let font = fixed_width_font(3);
        assert_eq!(font.text_width("abcd"), 12);
        assert_eq!(font.text_width(""), 0);
    }

    #[test]
    fn width_ignores_tags() {
        let font = fixed_width_font(3);
        assert_eq!(font.text_width("<col=ff0000>ab</col>"), 6);
        assert_eq!(font.text_width("<lt>a"), 6);
    }

    #[test]
    fn break_lines_wraps_on_spaces() {
        let font = fixed_width_font(4);
        let mut lines = Vec::new();
        // Limit of 20px = 5 chars; "alpha beta" must split at the space.
        let count = font.break_lines("alpha beta", Some(&[20]), &mut lines);
        assert_eq!(count, 2);
        assert_eq!(lines, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn break_lines_honours_br() {
        let font = fixed_width_font(4);
        let mut lines = Vec::new();
        let count = font.break_lines("one<br>two", None, &mut lines);
        assert_eq!(count, 2);
        assert_eq!(lines[0], "one<br>");
        assert_eq!(lines[1], "two");
    }

    #[test]
    fn break_lines_keeps_hyphen() {
        let font = fixed_width_font(4);
        let mut lines = Vec::new();
        let count = font.break_lines("one-two", Some(&[16]), &mut lines);
        assert_eq!(count, 2);
        assert_eq!(lines[0], "one-");
        assert_eq!(lines[1], "two");
    }

    #[test]
    fn line_count_without_limit_is_one() {
        let font = fixed_width_font(4);
        assert_eq!(font.line_count("hello world", 1_000_000), 1);
    }

    #[test]
    fn draw_string_paints_glyphs() {
        let mut font = fixed_width_font(4);
        let mut raster = Raster::new(16, 16);
        font.reset(0xFFFFFF, -1);
        font.draw_string(&mut raster, "a", 0, 8);
        assert!(raster.pixels.iter().any(|&p| p == 0xFFFFFF));
    }

    #[test]
    fn draw_lines_centres_single_line() {
        let mut font = fixed_width_font(4);
        let mut raster = Raster::new(32, 16);
        let count = font.draw_lines(&mut raster, "ab", 0, 0, 32, 16, 0xFF00, -1, 1, 0, 0);
        assert_eq!(count, 1);
        assert!(raster.pixels.iter().any(|&p| p == 0xFF00));
    }

    #[test]
    fn cp1252_mapping() {
        assert_eq!(char_to_cp1252('A'), b'A');
        assert_eq!(char_to_cp1252('\u{20AC}'), 0x80);
        assert_eq!(char_to_cp1252('\u{2122}'), 0x99);
        assert_eq!(char_to_cp1252('\u{4E00}'), b'?');
    }
}
