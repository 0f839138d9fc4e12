//! loam CLI
//!
//! Parse an HTML file (sniffing its charset) and either print the
//! serialized document or run a CSS selector against it.

use std::env;
use std::fs;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: loam <file.html> [selector]");
        eprintln!("       loam --html '<html>...</html>' [selector]");
        eprintln!();
        eprintln!("Options (before the file argument):");
        eprintln!("  --charset <label>   transport-declared charset");
        eprintln!("  --base <uri>        base URI for URL resolution");
        std::process::exit(1);
    }

    let mut charset: Option<String> = None;
    let mut base_uri = String::new();
    let mut rest = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--charset" => {
                charset = args.get(i + 1).cloned();
                i += 2;
            }
            "--base" => {
                base_uri = args.get(i + 1).cloned().unwrap_or_default();
                i += 2;
            }
            _ => {
                rest.push(args[i].clone());
                i += 1;
            }
        }
    }

    let (bytes, selector_arg) = if rest.first().map(String::as_str) == Some("--html") {
        let html = rest
            .get(1)
            .context("--html requires an HTML string argument")?;
        (html.clone().into_bytes(), rest.get(2).cloned())
    } else {
        let path = rest.first().context("missing input file")?;
        let bytes = fs::read(path).with_context(|| format!("reading {path}"))?;
        (bytes, rest.get(1).cloned())
    };

    let doc = loam_html::parse_bytes(&bytes, charset.as_deref(), &base_uri);

    match selector_arg {
        Some(selector) => {
            let matches = loam_select::query(&doc, &selector)
                .with_context(|| format!("compiling selector {selector:?}"))?;
            eprintln!(
                "{} match(es) for {selector:?} [{}]",
                matches.len(),
                doc.output_settings().charset().name()
            );
            for id in matches {
                println!("{}", doc.outer_html(id));
            }
        }
        None => println!("{}", doc.outer_html(doc.root())),
    }

    Ok(())
}
