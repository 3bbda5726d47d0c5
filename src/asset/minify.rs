//! JavaScript minification for script build blocks.
//!
//! Uses oxc: parse, compress + mangle, then codegen with an optional
//! source map for the concatenated input.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minified output plus its source map (when requested).
pub struct MinifiedJs {
    pub code: String,
    pub map: Option<String>,
}

/// Minify JavaScript source code.
///
/// `map_path` names the generated asset in the emitted source map; pass
/// `None` to skip map generation. Returns `None` when the source fails to
/// parse.
pub fn minify_js(source: &str, map_path: Option<&Path>) -> Option<MinifiedJs> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let out = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: map_path.map(Path::to_path_buf),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    Some(MinifiedJs {
        code: out.code,
        map: out.map.map(|m| m.to_json_string()),
    })
}
