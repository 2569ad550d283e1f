// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Color validation and conversion

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref HEX_COLOR: Regex =
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex");

    /// Subset of CSS named colors the widgets accept
    static ref NAMED_COLORS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("black", "#000000");
        m.insert("white", "#ffffff");
        m.insert("red", "#ff0000");
        m.insert("green", "#008000");
        m.insert("blue", "#0000ff");
        m.insert("yellow", "#ffff00");
        m.insert("orange", "#ffa500");
        m.insert("purple", "#800080");
        m.insert("gray", "#808080");
        m.insert("grey", "#808080");
        m.insert("silver", "#c0c0c0");
        m.insert("maroon", "#800000");
        m.insert("olive", "#808000");
        m.insert("lime", "#00ff00");
        m.insert("aqua", "#00ffff");
        m.insert("teal", "#008080");
        m.insert("navy", "#000080");
        m.insert("fuchsia", "#ff00ff");
        m
    };
}

/// Whether the string is a `#rgb` or `#rrggbb` hex color
pub fn is_hex_color(s: &str) -> bool {
    HEX_COLOR.is_match(s)
}

/// Resolve a CSS color name to its hex value
pub fn named_color(name: &str) -> Option<&'static str> {
    NAMED_COLORS.get(name.to_lowercase().as_str()).copied()
}

/// Normalize a color (hex or name) to lowercase `#rrggbb`
pub fn normalize(color: &str) -> Result<String> {
    let color = color.trim();

    if let Some(hex) = named_color(color) {
        return Ok(hex.to_string());
    }
    if !is_hex_color(color) {
        return Err(Error::config(format!("invalid color '{}'", color)));
    }

    let digits = &color[1..];
    if digits.len() == 3 {
        let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
        Ok(format!("#{}", expanded.to_lowercase()))
    } else {
        Ok(format!("#{}", digits.to_lowercase()))
    }
}

/// Parse a color into its RGB components
pub fn to_rgb(color: &str) -> Result<(u8, u8, u8)> {
    let normalized = normalize(color)?;
    let digits = &normalized[1..];
    let r = u8::from_str_radix(&digits[0..2], 16).map_err(|e| Error::config(e.to_string()))?;
    let g = u8::from_str_radix(&digits[2..4], 16).map_err(|e| Error::config(e.to_string()))?;
    let b = u8::from_str_radix(&digits[4..6], 16).map_err(|e| Error::config(e.to_string()))?;
    Ok((r, g, b))
}

/// Render RGB components as `#rrggbb`
pub fn from_rgb(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}
