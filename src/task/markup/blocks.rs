//! Build-block parsing for markup files.
//!
//! A build block groups asset references for concatenation into a single
//! target file:
//!
//! ```html
//! <!-- build:js js/main.min.js -->
//! <script src="js/nav.js"></script>
//! <script src="js/app.js"></script>
//! <!-- endbuild -->
//! ```
//!
//! Supported kinds: `js` (concatenate + minify), `css` (concatenate),
//! `remove` (drop the block entirely).

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

/// `<!-- build:<kind> <target> --> ... <!-- endbuild -->`
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s*build:(\w+)(?:\s+(\S+))?\s*-->(.*?)<!--\s*endbuild\s*-->")
        .expect("block regex is valid")
});

/// `src="..."` / `href="..."` references inside a block body.
static REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:src|href)\s*=\s*["']([^"']+)["']"#).expect("ref regex is valid")
});

/// Kind of a build block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Js,
    Css,
    Remove,
}

impl BlockKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "js" => Some(Self::Js),
            "css" => Some(Self::Css),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// A parsed build block.
#[derive(Debug)]
pub struct BuildBlock {
    pub kind: BlockKind,
    /// Output path of the concatenated asset, relative to the dist root.
    /// Empty for `remove` blocks.
    pub target: String,
    /// Referenced asset paths, in document order.
    pub refs: Vec<String>,
    /// Byte range of the whole block in the source document.
    pub span: (usize, usize),
}

impl BuildBlock {
    /// The tag that replaces the block in the output document.
    pub fn replacement_tag(&self) -> String {
        match self.kind {
            BlockKind::Js => format!(r#"<script src="{}"></script>"#, self.target),
            BlockKind::Css => {
                format!(r#"<link rel="stylesheet" href="{}">"#, self.target)
            }
            BlockKind::Remove => String::new(),
        }
    }
}

/// Find all build blocks in a document, in order.
pub fn find_blocks(html: &str) -> Result<Vec<BuildBlock>> {
    let mut blocks = Vec::new();

    for captures in BLOCK_RE.captures_iter(html) {
        let whole = captures.get(0).expect("group 0 always present");
        let kind_str = &captures[1];

        let Some(kind) = BlockKind::parse(kind_str) else {
            bail!("unknown build block kind '{kind_str}'");
        };

        let target = captures
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        if target.is_empty() && kind != BlockKind::Remove {
            bail!("build block '{kind_str}' is missing a target path");
        }

        let body = captures.get(3).map_or("", |m| m.as_str());
        let refs = REF_RE
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .collect();

        blocks.push(BuildBlock {
            kind,
            target,
            refs,
            span: (whole.start(), whole.end()),
        });
    }

    Ok(blocks)
}
