use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// A4 page size in PDF points.
pub const A4_WIDTH: f64 = 595.276;
pub const A4_HEIGHT: f64 = 841.890;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Decoded raster image ready for embedding: 8-bit RGB samples plus an
/// optional 8-bit alpha channel carried as a PDF soft mask.
#[derive(Debug, Clone)]
pub struct PdfImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

/// Decode a PNG into raw RGB + alpha samples.
///
/// Supports the shapes a signature canvas or logo upload produces: 8-bit
/// depth, non-interlaced, color types greyscale, RGB, palette,
/// greyscale+alpha, and RGBA.
pub fn decode_png(bytes: &[u8]) -> Result<PdfImage, String> {
    if bytes.len() < 8 || bytes[..8] != PNG_SIGNATURE {
        return Err("not a PNG image".to_string());
    }

    let mut width = 0u32;
    let mut height = 0u32;
    let mut bit_depth = 0u8;
    let mut color_type = 0u8;
    let mut interlace = 0u8;
    let mut palette: Vec<u8> = Vec::new();
    let mut idat: Vec<u8> = Vec::new();
    let mut seen_ihdr = false;

    let mut pos = 8;
    while pos + 8 <= bytes.len() {
        let length = u32::from_be_bytes([
            bytes[pos],
            bytes[pos + 1],
            bytes[pos + 2],
            bytes[pos + 3],
        ]) as usize;
        let chunk_type = &bytes[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = data_start + length;
        if data_end + 4 > bytes.len() {
            return Err("truncated PNG chunk".to_string());
        }
        let data = &bytes[data_start..data_end];

        match chunk_type {
            b"IHDR" => {
                if data.len() != 13 {
                    return Err("malformed IHDR chunk".to_string());
                }
                width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
                height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
                bit_depth = data[8];
                color_type = data[9];
                interlace = data[12];
                seen_ihdr = true;
            }
            b"PLTE" => palette.extend_from_slice(data),
            b"IDAT" => idat.extend_from_slice(data),
            b"IEND" => break,
            _ => {}
        }

        pos = data_end + 4; // skip CRC
    }

    if !seen_ihdr {
        return Err("missing IHDR chunk".to_string());
    }
    if width == 0 || height == 0 {
        return Err("zero-sized PNG".to_string());
    }
    if bit_depth != 8 {
        return Err(format!("unsupported PNG bit depth {}", bit_depth));
    }
    if interlace != 0 {
        return Err("interlaced PNG is not supported".to_string());
    }

    let channels = match color_type {
        0 => 1, // greyscale
        2 => 3, // RGB
        3 => 1, // palette index
        4 => 2, // greyscale + alpha
        6 => 4, // RGBA
        other => return Err(format!("unsupported PNG color type {}", other)),
    };

    let mut raw = Vec::new();
    ZlibDecoder::new(idat.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| format!("failed to inflate PNG data: {}", e))?;

    let stride = width as usize * channels;
    let expected = height as usize * (stride + 1);
    if raw.len() < expected {
        return Err("PNG pixel data shorter than expected".to_string());
    }

    let pixels = unfilter(&raw, width as usize, height as usize, channels)?;

    let count = width as usize * height as usize;
    let mut rgb = Vec::with_capacity(count * 3);
    let mut alpha: Option<Vec<u8>> = None;

    match color_type {
        0 => {
            for &g in &pixels {
                rgb.extend_from_slice(&[g, g, g]);
            }
        }
        2 => rgb = pixels,
        3 => {
            for &index in &pixels {
                let offset = index as usize * 3;
                if offset + 3 > palette.len() {
                    return Err("PNG palette index out of range".to_string());
                }
                rgb.extend_from_slice(&palette[offset..offset + 3]);
            }
        }
        4 => {
            let mut mask = Vec::with_capacity(count);
            for chunk in pixels.chunks_exact(2) {
                rgb.extend_from_slice(&[chunk[0], chunk[0], chunk[0]]);
                mask.push(chunk[1]);
            }
            alpha = Some(mask);
        }
        6 => {
            let mut mask = Vec::with_capacity(count);
            for chunk in pixels.chunks_exact(4) {
                rgb.extend_from_slice(&chunk[..3]);
                mask.push(chunk[3]);
            }
            alpha = Some(mask);
        }
        _ => unreachable!(),
    }

    Ok(PdfImage {
        width,
        height,
        rgb,
        alpha,
    })
}

// Reverse the per-scanline PNG filters (spec filter types 0-4).
fn unfilter(raw: &[u8], width: usize, height: usize, channels: usize) -> Result<Vec<u8>, String> {
    let stride = width * channels;
    let mut out: Vec<u8> = Vec::with_capacity(stride * height);

    for row in 0..height {
        let line_start = row * (stride + 1);
        let filter = raw[line_start];
        let line = &raw[line_start + 1..line_start + 1 + stride];
        let prev_start = out.len().saturating_sub(stride);

        for i in 0..stride {
            let x = line[i];
            let a = if i >= channels {
                out[out.len() - channels]
            } else {
                0
            };
            let b = if row > 0 { out[prev_start + i] } else { 0 };
            let c = if row > 0 && i >= channels {
                out[prev_start + i - channels]
            } else {
                0
            };

            let value = match filter {
                0 => x,
                1 => x.wrapping_add(a),
                2 => x.wrapping_add(b),
                3 => x.wrapping_add(((a as u16 + b as u16) / 2) as u8),
                4 => x.wrapping_add(paeth(a, b, c)),
                other => return Err(format!("unknown PNG filter type {}", other)),
            };
            out.push(value);
        }
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

struct PlacedImage {
    image: PdfImage,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// One page of output: Helvetica text runs plus placed images.
#[derive(Default)]
pub struct Page {
    text_ops: Vec<u8>,
    images: Vec<PlacedImage>,
}

impl Page {
    pub fn draw_text(&mut self, x: f64, y: f64, size: f64, text: &str) {
        let mut escaped = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let byte = if (ch as u32) < 256 { ch as u32 as u8 } else { b'?' };
            match byte {
                b'(' | b')' | b'\\' => {
                    escaped.push(b'\\');
                    escaped.push(byte);
                }
                b'\n' | b'\r' => escaped.push(b' '),
                _ => escaped.push(byte),
            }
        }
        self.text_ops
            .extend_from_slice(format!("BT /F1 {} Tf {} {} Td (", size, x, y).as_bytes());
        self.text_ops.extend_from_slice(&escaped);
        self.text_ops.extend_from_slice(b") Tj ET\n");
    }

    pub fn draw_image(&mut self, image: PdfImage, x: f64, y: f64, width: f64, height: f64) {
        self.images.push(PlacedImage {
            image,
            x,
            y,
            width,
            height,
        });
    }
}

/// Minimal single-font PDF 1.4 writer.
///
/// Nothing in the dependency set renders PDF, so the exporter emits the
/// format directly: A4 pages, a Helvetica text state, and FlateDecode
/// image XObjects with soft masks for alpha.
#[derive(Default)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn save(&self) -> Vec<u8> {
        // Object numbering: 1 catalog, 2 page tree, 3 font, then per page
        // its image objects (soft mask before image), content stream, and
        // the page object itself.
        let mut objects: Vec<Vec<u8>> = vec![Vec::new(), Vec::new(), Vec::new()];
        objects[2] =
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec();

        let mut page_object_ids = Vec::new();

        for page in &self.pages {
            let mut resource_entries = String::new();
            let mut content = page.text_ops.clone();

            for (index, placed) in page.images.iter().enumerate() {
                let smask_id = placed.image.alpha.as_ref().map(|mask| {
                    objects.push(image_object(
                        placed.image.width,
                        placed.image.height,
                        "/DeviceGray",
                        mask,
                        None,
                    ));
                    objects.len()
                });
                objects.push(image_object(
                    placed.image.width,
                    placed.image.height,
                    "/DeviceRGB",
                    &placed.image.rgb,
                    smask_id,
                ));
                let image_id = objects.len();

                resource_entries.push_str(&format!("/Im{} {} 0 R ", index, image_id));
                content.extend_from_slice(
                    format!(
                        "q {} 0 0 {} {} {} cm /Im{} Do Q\n",
                        placed.width, placed.height, placed.x, placed.y, index
                    )
                    .as_bytes(),
                );
            }

            objects.push(stream_object("", &content));
            let content_id = objects.len();

            let xobjects = if resource_entries.is_empty() {
                String::new()
            } else {
                format!("/XObject << {} >> ", resource_entries)
            };
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R >> {} >> /Contents {} 0 R >>",
                    A4_WIDTH,
                    A4_HEIGHT,
                    xobjects,
                    content_id
                )
                .into_bytes(),
            );
            page_object_ids.push(objects.len());
        }

        let kids = page_object_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[0] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        objects[1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_object_ids.len()
        )
        .into_bytes();

        assemble(&objects)
    }
}

fn image_object(
    width: u32,
    height: u32,
    color_space: &str,
    samples: &[u8],
    smask_id: Option<usize>,
) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writes to a Vec cannot fail
    encoder.write_all(samples).expect("zlib encode");
    let compressed = encoder.finish().expect("zlib finish");

    let smask = smask_id
        .map(|id| format!("/SMask {} 0 R ", id))
        .unwrap_or_default();
    let dict = format!(
        "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} \
         /BitsPerComponent 8 /Filter /FlateDecode {}",
        width, height, color_space, smask
    );
    stream_object(&dict, &compressed)
}

fn stream_object(dict_entries: &str, data: &[u8]) -> Vec<u8> {
    let mut object = format!(
        "<< {} /Length {} >>\nstream\n",
        dict_entries,
        data.len()
    )
    .into_bytes();
    object.extend_from_slice(data);
    object.extend_from_slice(b"\nendstream");
    object
}

fn assemble(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());

    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}
