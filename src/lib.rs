//! filterlab
//!
//! Per-pixel image filtering engine with progress reporting and cooperative
//! cancellation, plus Python bindings via PyO3 and WASM bindings for
//! JavaScript.
//!
//! ## Image Format
//! Images are 8-bit RGB, stored as `(height, width, 3)` arrays in a
//! [`PixelBuffer`]. Every channel value stays in 0-255; out-of-range
//! intermediate results are clamped before storage.
//!
//! ## Filter Architecture
//! A filter implements [`PixelFilter`]: an optional whole-image pre-pass and
//! a per-pixel mapping. The shared loop in [`process()`] walks columns, reports
//! progress once per column and stops early when cancellation is requested.
//! Output always has the input's dimensions.
//!
//! ```
//! use filterlab::{FilterId, FilterSettings, PixelBuffer, Rgb};
//!
//! let image = PixelBuffer::filled(4, 4, Rgb::new(10, 20, 30)).unwrap();
//! let filter = FilterSettings::default().build(FilterId::Invert).unwrap();
//! let inverted = filter.apply(&image);
//! assert_eq!(inverted.pixel(0, 0), Rgb::new(245, 235, 225));
//! ```

pub mod error;
pub mod filters;
pub mod image;
pub mod process;
pub mod registry;
pub mod worker;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Error, Result};
pub use filters::{Filter, PixelFilter};
pub use image::{PixelBuffer, Rgb};
pub use process::{process, process_with, CancellationToken, FilterOutcome, ProgressSink};
pub use registry::{FilterId, FilterSettings};
pub use worker::{FilterWorker, WorkerEvent};

/// Build the named filter, taking parameters from optional JSON settings.
pub fn filter_by_name(name: &str, settings_json: Option<&str>) -> Result<Filter> {
    let id: FilterId = name.parse()?;
    let settings = match settings_json {
        Some(json) => FilterSettings::from_json_str(json)?,
        None => FilterSettings::default(),
    };
    settings.build(id)
}

/// Names accepted by [`filter_by_name`], in menu order.
pub fn filter_names() -> Vec<&'static str> {
    FilterId::ALL.iter().map(|id| id.name()).collect()
}

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::Error;
    use crate::image::PixelBuffer;

    impl From<Error> for PyErr {
        fn from(err: Error) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    /// Apply a filter by name to an RGB u8 image.
    ///
    /// # Arguments
    /// * `image` - Input image (height, width, 3)
    /// * `name` - Filter name, see `filter_names()`
    /// * `settings_json` - Optional JSON object overriding filter parameters
    ///
    /// # Returns
    /// Filtered image with the same shape
    #[pyfunction]
    #[pyo3(signature = (image, name, settings_json=None))]
    pub fn apply_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
        settings_json: Option<&str>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let filter = crate::filter_by_name(name, settings_json)?;
        let source = PixelBuffer::from_array(image.as_array().to_owned())?;
        let result = py.allow_threads(|| filter.apply(&source));
        Ok(result.into_array().into_pyarray(py))
    }

    /// Names accepted by `apply_filter`.
    #[pyfunction]
    pub fn filter_names() -> Vec<&'static str> {
        crate::filter_names()
    }

    /// filterlab extension module
    #[pymodule]
    pub fn filterlab(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(apply_filter, m)?)?;
        m.add_function(wrap_pyfunction!(filter_names, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::filterlab;
