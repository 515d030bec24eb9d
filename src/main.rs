//! # Linebox CLI
//!
//! Usage:
//!   linebox input.json
//!   echo '{ ... }' | linebox --json -o fragments.json
//!   linebox --example > article.json
//!
//! Prints the fragment tree of every fragmentainer, or its JSON form with
//! `--json`. Set `RUST_LOG=debug` to see line and fragmentainer breaks.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use linebox::model::Document;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_article_json());
        return;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).unwrap_or_else(|e| fail(&format!("Failed to read {}: {e}", args[1])))
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            fail(&format!("Failed to read stdin: {e}"));
        }
        buf
    };

    let output_path = args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone());
    let as_json = args.iter().any(|a| a == "--json");

    let output = if as_json {
        linebox::layout_json(&input)
    } else {
        serde_json::from_str::<Document>(&input)
            .map_err(Into::into)
            .and_then(|document| linebox::layout(&document))
            .map(|fragments| {
                fragments
                    .iter()
                    .enumerate()
                    .map(|(i, fragment)| format!("# fragmentainer {i}\n{}", fragment.dump_tree()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
    };

    let output = output.unwrap_or_else(|e| fail(&format!("✗ {e}")));
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                fail(&format!("Failed to write {path}: {e}"));
            }
            eprintln!("✓ Written {} bytes to {path}", output.len());
        }
        None => println!("{output}"),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

fn example_article_json() -> &'static str {
    r##"{
  "fragmentainer": { "width": 300, "height": 200 },
  "children": [
    {
      "kind": { "type": "Text", "content": "Line breaking" },
      "style": { "fontSize": 18, "fontWeight": 700, "margin": { "top": 0, "right": 0, "bottom": 8, "left": 0 } }
    },
    {
      "kind": { "type": "Block" },
      "style": {
        "float": "Right",
        "width": { "Pt": 90 },
        "padding": { "top": 4, "right": 4, "bottom": 4, "left": 4 },
        "margin": { "top": 0, "right": 0, "bottom": 4, "left": 8 }
      },
      "children": [
        { "kind": { "type": "Text", "content": "Floats are laid out on their own and kept with their parent." }, "style": { "fontSize": 8 } }
      ]
    },
    {
      "kind": { "type": "Text", "content": "A paragraph is shaped once. Each line reuses that shaping, and only the glyphs at the line's edges are shaped again when the break falls inside a ligature such as fi or a kerned pair." },
      "style": { "margin": { "top": 0, "right": 0, "bottom": 10, "left": 0 } }
    },
    {
      "kind": { "type": "Text", "content": "Hyphenation finds breaks inside extraordinarily long words when a line would otherwise overflow." },
      "style": { "hyphens": "Auto", "lang": "en" }
    },
    {
      "kind": { "type": "Text", "content": "Mandatory breaks end a line\nright where they occur." }
    }
  ]
}
"##
}
