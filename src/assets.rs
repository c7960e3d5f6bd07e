// SPDX-License-Identifier: GPL-3.0-only

//! Artwork embedded into the binary

use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

/// Raw bytes of an embedded asset
pub fn get(name: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(name).map(|file| file.data)
}
