//! WebAssembly exports for filterlab.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat interleaved RGB bytes (length = width * height * 3).

use wasm_bindgen::prelude::*;

use crate::error::Error;
use crate::image::PixelBuffer;

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Apply a filter by name to an RGB image.
///
/// # Arguments
/// * `data` - Flat array of RGB bytes (length = width * height * 3)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `name` - Filter name, see `filter_names_wasm`
///
/// # Returns
/// Flat array of RGB bytes with the same dimensions
#[wasm_bindgen]
pub fn apply_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    name: &str,
) -> Result<Vec<u8>, JsValue> {
    let filter = crate::filter_by_name(name, None).map_err(to_js)?;
    let source = PixelBuffer::from_raw(width, height, data.to_vec()).map_err(to_js)?;
    Ok(filter.apply(&source).into_raw())
}

/// Apply a filter with parameters given as a JSON object.
#[wasm_bindgen]
pub fn apply_filter_with_settings_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    name: &str,
    settings_json: &str,
) -> Result<Vec<u8>, JsValue> {
    let filter = crate::filter_by_name(name, Some(settings_json)).map_err(to_js)?;
    let source = PixelBuffer::from_raw(width, height, data.to_vec()).map_err(to_js)?;
    Ok(filter.apply(&source).into_raw())
}

/// Names accepted by `apply_filter_wasm`.
#[wasm_bindgen]
pub fn filter_names_wasm() -> Vec<String> {
    crate::filter_names().into_iter().map(String::from).collect()
}
