// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! String, array, and color helpers

pub mod arrays;
pub mod color;
pub mod strings;
