// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanned-PDF page extraction using the `lopdf` crate.
//
// Scanner output places one image XObject per page. The first page's largest
// image is decoded and rescaled to the page's MediaBox at the configured DPI,
// so downstream pixel constants see the same resolution whatever the scanner
// embedded.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream};
use rollcall_core::error::{Result, RollcallError};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;

/// PDF user-space units per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Decode the first page of the PDF at `path` into a page image.
#[instrument(skip_all, fields(path = %path.display(), dpi))]
pub fn first_page_image(path: &Path, dpi: u32) -> Result<DynamicImage> {
    let document = Document::load(path).map_err(|err| {
        RollcallError::Decode(format!("failed to open PDF {}: {}", path.display(), err))
    })?;

    let pages = document.get_pages();
    let page_id = *pages
        .values()
        .next()
        .ok_or_else(|| RollcallError::EmptyDocument(path.display().to_string()))?;
    debug!(pages = pages.len(), "PDF loaded");

    let page = document
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|err| RollcallError::Decode(format!("unreadable page object: {}", err)))?;

    let stream = largest_page_image(&document, page)?.ok_or_else(|| {
        RollcallError::Decode(format!(
            "first page of {} has no embedded scan image",
            path.display()
        ))
    })?;
    let image = decode_image_stream(stream)?;

    match media_box_pixels(&document, page, dpi) {
        Some((width, height)) if (width, height) != (image.width(), image.height()) => {
            info!(
                from_w = image.width(),
                from_h = image.height(),
                width,
                height,
                "Rescaling embedded scan to page size"
            );
            Ok(ImageProcessor::from_dynamic(image)
                .resize_exact_hq(width, height)
                .into_dynamic())
        }
        Some(_) => Ok(image),
        None => {
            warn!("Page has no usable MediaBox; keeping embedded resolution");
            Ok(image)
        }
    }
}

/// Look up `key` on the page dictionary, following the `/Parent` chain for
/// inheritable attributes.
fn inherited<'a>(document: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    // The page tree is shallow; the bound guards against reference cycles.
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return document.dereference(value).ok().map(|(_, object)| object);
        }
        let parent = node.get(b"Parent").ok()?;
        let (_, parent) = document.dereference(parent).ok()?;
        node = parent.as_dict().ok()?;
    }
    None
}

/// Find the image XObject with the most pixels among the page's resources.
fn largest_page_image<'a>(
    document: &'a Document,
    page: &'a Dictionary,
) -> Result<Option<&'a Stream>> {
    let Some(resources) = inherited(document, page, b"Resources").and_then(|o| o.as_dict().ok())
    else {
        return Ok(None);
    };
    let Ok(xobjects) = resources.get(b"XObject") else {
        return Ok(None);
    };
    let (_, xobjects) = document
        .dereference(xobjects)
        .map_err(|err| RollcallError::Decode(format!("broken XObject reference: {}", err)))?;
    let Ok(xobjects) = xobjects.as_dict() else {
        return Ok(None);
    };

    let mut best: Option<(u64, &Stream)> = None;
    for (name, entry) in xobjects.iter() {
        let Ok((_, object)) = document.dereference(entry) else {
            warn!(name = %String::from_utf8_lossy(name), "Cannot resolve XObject, skipping");
            continue;
        };
        let Ok(stream) = object.as_stream() else {
            continue;
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|subtype| subtype == b"Image");
        if !is_image {
            continue;
        }
        let pixels = dimension(&stream.dict, b"Width") as u64 * dimension(&stream.dict, b"Height") as u64;
        if best.is_none_or(|(most, _)| pixels > most) {
            best = Some((pixels, stream));
        }
    }

    Ok(best.map(|(_, stream)| stream))
}

fn dimension(dict: &Dictionary, key: &[u8]) -> u32 {
    dict.get(key)
        .and_then(Object::as_i64)
        .map(|v| v.max(0) as u32)
        .unwrap_or(0)
}

fn filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode a JPEG-compressed or raw 8-bit gray/RGB image stream.
fn decode_image_stream(stream: &Stream) -> Result<DynamicImage> {
    let filters = filters(&stream.dict);

    if filters.iter().any(|f| f == b"DCTDecode") {
        return image::load_from_memory(&stream.content).map_err(|err| {
            RollcallError::Decode(format!("embedded JPEG could not be decoded: {}", err))
        });
    }

    let width = dimension(&stream.dict, b"Width");
    let height = dimension(&stream.dict, b"Height");
    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        return Err(RollcallError::Decode(format!(
            "unsupported embedded image depth: {bits} bits per component"
        )));
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else if filters.iter().all(|f| f == b"FlateDecode") {
        stream.decompressed_content().map_err(|err| {
            RollcallError::Decode(format!("embedded image could not be inflated: {}", err))
        })?
    } else {
        let names: Vec<String> = filters
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect();
        return Err(RollcallError::Decode(format!(
            "unsupported embedded image filter: {}",
            names.join(", ")
        )));
    };

    let color_space = stream
        .dict
        .get(b"ColorSpace")
        .and_then(Object::as_name)
        .map(|n| n.to_vec())
        .unwrap_or_default();

    let image = match color_space.as_slice() {
        b"DeviceGray" => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        b"DeviceRGB" => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        other => {
            return Err(RollcallError::Decode(format!(
                "unsupported embedded colour space: {}",
                String::from_utf8_lossy(other)
            )));
        }
    };

    image.ok_or_else(|| {
        RollcallError::Decode(format!(
            "embedded image data is shorter than {width}x{height}"
        ))
    })
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Page size in pixels at `dpi`, from the (possibly inherited) MediaBox.
fn media_box_pixels(document: &Document, page: &Dictionary, dpi: u32) -> Option<(u32, u32)> {
    let corners: Vec<f64> = inherited(document, page, b"MediaBox")?
        .as_array()
        .ok()?
        .iter()
        .filter_map(number)
        .collect();
    if corners.len() != 4 {
        return None;
    }
    let scale = dpi as f64 / POINTS_PER_INCH;
    let width = ((corners[2] - corners[0]).abs() * scale).round() as u32;
    let height = ((corners[3] - corners[1]).abs() * scale).round() as u32;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}
