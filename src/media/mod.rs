// SPDX-License-Identifier: MPL-2.0

//! Media transport helpers
//!
//! Strips travel to the mail relay inside JSON bodies, so the only transport
//! encoding needed here is the `data:` URI form of an encoded image.
//!
//! # Modules
//!
//! - [`data_uri`]: base64 `data:` URI encoding and parsing

pub mod data_uri;

pub use data_uri::{DecodedImage, parse_data_uri, to_data_uri};
